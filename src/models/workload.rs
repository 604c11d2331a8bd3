//! Per-worker workload description and scenario presets

use crate::types::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How each worker's topic is chosen
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TopicPlan {
    /// Every worker subscribes to the same topic
    Fixed(String),
    /// Worker i subscribes to `prefix` followed by a 1-based id that wraps after `max`
    RoundRobin { prefix: String, max: usize },
}

impl TopicPlan {
    /// Topic for the given 1-based worker index
    pub fn topic_for(&self, worker: usize) -> String {
        match self {
            TopicPlan::Fixed(topic) => topic.clone(),
            TopicPlan::RoundRobin { prefix, max } => {
                let max = (*max).max(1);
                let id = worker.saturating_sub(1) % max + 1;
                format!("{}{}", prefix, id)
            }
        }
    }

    /// Base topic name (the prefix for round-robin plans)
    pub fn base(&self) -> &str {
        match self {
            TopicPlan::Fixed(topic) => topic,
            TopicPlan::RoundRobin { prefix, .. } => prefix,
        }
    }

    /// Rebuild the plan around a different base topic, keeping its shape
    pub fn with_base(&self, base: String) -> Self {
        match self {
            TopicPlan::Fixed(_) => TopicPlan::Fixed(base),
            TopicPlan::RoundRobin { max, .. } => TopicPlan::RoundRobin { prefix: base, max: *max },
        }
    }
}

impl fmt::Display for TopicPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TopicPlan::Fixed(topic) => write!(f, "{}", topic),
            TopicPlan::RoundRobin { prefix, max } => write!(f, "{}{{1..{}}}", prefix, max),
        }
    }
}

/// What every worker in the pool is asked to do
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workload {
    /// Matching event number at which a probe stops its clock
    pub target_count: u64,
    /// Emit a progress observation every N matching events
    pub print_every: u64,
    /// Topic assignment across workers
    pub topics: TopicPlan,
}

impl Workload {
    pub fn validate(&self) -> Result<()> {
        if self.target_count < crate::probe::CLOCK_START_EVENT {
            return Err(AppError::config(format!(
                "Target count must be at least {}, got {}",
                crate::probe::CLOCK_START_EVENT,
                self.target_count
            )));
        }

        if self.print_every == 0 {
            return Err(AppError::config("Print interval must be greater than 0"));
        }

        if self.topics.base().is_empty() {
            return Err(AppError::config("Topic cannot be empty"));
        }

        if let TopicPlan::RoundRobin { max, .. } = self.topics {
            if max == 0 {
                return Err(AppError::config("Topic range must be greater than 0"));
            }
        }

        Ok(())
    }
}

/// Named benchmark scenarios
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Scenario {
    /// Few events per worker, checks that every subscriber gets them
    Delivery,
    /// All workers on one busy topic
    Chatroom,
    /// Workers spread across a range of topics
    MultiTopic,
}

impl Scenario {
    /// Preset workload for this scenario
    pub fn workload(&self) -> Workload {
        match self {
            Scenario::Delivery => Workload {
                target_count: 3,
                print_every: 1,
                topics: TopicPlan::Fixed("to_be_delivered".to_string()),
            },
            Scenario::Chatroom => Workload {
                target_count: 100_000,
                print_every: 1_000,
                topics: TopicPlan::Fixed("chatroom_message".to_string()),
            },
            Scenario::MultiTopic => Workload {
                target_count: 1_000,
                print_every: 100,
                topics: TopicPlan::RoundRobin {
                    prefix: "chatroom_message".to_string(),
                    max: 100,
                },
            },
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Scenario::Delivery => "delivery",
            Scenario::Chatroom => "chatroom",
            Scenario::MultiTopic => "multi-topic",
        }
    }
}

impl FromStr for Scenario {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "delivery" => Ok(Scenario::Delivery),
            "chatroom" => Ok(Scenario::Chatroom),
            "multi-topic" | "multitopic" | "multi_topic" => Ok(Scenario::MultiTopic),
            other => Err(AppError::config(format!(
                "Unknown scenario '{}': expected delivery, chatroom or multi-topic",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_topic_plan() {
        let plan = TopicPlan::Fixed("chatroom_message".to_string());
        assert_eq!(plan.topic_for(1), "chatroom_message");
        assert_eq!(plan.topic_for(500), "chatroom_message");
    }

    #[test]
    fn test_round_robin_wraps_after_max() {
        let plan = TopicPlan::RoundRobin {
            prefix: "chatroom_message".to_string(),
            max: 100,
        };
        assert_eq!(plan.topic_for(1), "chatroom_message1");
        assert_eq!(plan.topic_for(100), "chatroom_message100");
        assert_eq!(plan.topic_for(101), "chatroom_message1");
        assert_eq!(plan.topic_for(250), "chatroom_message50");
    }

    #[test]
    fn test_with_base_keeps_shape() {
        let plan = TopicPlan::RoundRobin { prefix: "a".to_string(), max: 3 };
        assert_eq!(
            plan.with_base("room".to_string()),
            TopicPlan::RoundRobin { prefix: "room".to_string(), max: 3 }
        );
        assert_eq!(plan.to_string(), "a{1..3}");
    }

    #[test]
    fn test_scenario_presets() {
        let delivery = Scenario::Delivery.workload();
        assert_eq!(delivery.target_count, 3);
        assert_eq!(delivery.print_every, 1);

        let multi = Scenario::MultiTopic.workload();
        assert!(matches!(multi.topics, TopicPlan::RoundRobin { max: 100, .. }));

        for scenario in [Scenario::Delivery, Scenario::Chatroom, Scenario::MultiTopic] {
            assert!(scenario.workload().validate().is_ok());
            assert_eq!(scenario.name().parse::<Scenario>().unwrap(), scenario);
        }
    }

    #[test]
    fn test_workload_validation() {
        let mut workload = Scenario::Chatroom.workload();
        workload.target_count = 1;
        assert!(workload.validate().is_err());

        let mut workload = Scenario::Chatroom.workload();
        workload.print_every = 0;
        assert!(workload.validate().is_err());

        let workload = Workload {
            target_count: 10,
            print_every: 1,
            topics: TopicPlan::RoundRobin { prefix: "t".to_string(), max: 0 },
        };
        assert!(workload.validate().is_err());
    }
}

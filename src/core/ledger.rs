//! 分配账本：task_id -> {agent_name, assigned}
//!
//! 每个任务至多一条分配记录，重复分配覆盖旧记录（后写者胜）；只有存在且 assigned 为 true 的记录才允许执行。

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::core::ServiceError;

/// 单条分配记录
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub agent_name: String,
    pub assigned: bool,
}

#[derive(Debug, Default)]
pub struct AssignmentLedger {
    records: IndexMap<String, Assignment>,
}

impl AssignmentLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// 建立（或覆盖）分配；task_known / agent_known 由持有实体表的调用方给出
    pub fn assign(
        &mut self,
        task_id: &str,
        agent_name: &str,
        task_known: bool,
        agent_known: bool,
    ) -> Result<Assignment, ServiceError> {
        if !task_known || !agent_known {
            return Err(ServiceError::NotFound("Agent or task not found".to_string()));
        }
        let assignment = Assignment {
            agent_name: agent_name.to_string(),
            assigned: true,
        };
        self.records.insert(task_id.to_string(), assignment.clone());
        Ok(assignment)
    }

    pub fn is_executable(&self, task_id: &str) -> bool {
        self.records.get(task_id).is_some_and(|a| a.assigned)
    }

    /// 解析执行该任务的 Agent 名
    pub fn resolve(&self, task_id: &str) -> Result<String, ServiceError> {
        match self.records.get(task_id) {
            Some(a) if a.assigned => Ok(a.agent_name.clone()),
            _ => Err(ServiceError::NotAssigned(
                "Task is not assigned or does not exist.".to_string(),
            )),
        }
    }

    pub fn get(&self, task_id: &str) -> Option<&Assignment> {
        self.records.get(task_id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// 副本
    pub fn snapshot(&self) -> IndexMap<String, Assignment> {
        self.records.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unassigned_is_not_executable() {
        let ledger = AssignmentLedger::new();
        assert!(!ledger.is_executable("t1"));
        assert!(matches!(ledger.resolve("t1"), Err(ServiceError::NotAssigned(_))));
    }

    #[test]
    fn test_assign_unknown_entities() {
        let mut ledger = AssignmentLedger::new();
        assert!(matches!(
            ledger.assign("t1", "a1", false, true),
            Err(ServiceError::NotFound(_))
        ));
        assert!(matches!(
            ledger.assign("t1", "a1", true, false),
            Err(ServiceError::NotFound(_))
        ));
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_last_assignment_wins() {
        let mut ledger = AssignmentLedger::new();
        for agent in ["a1", "a2", "a3", "a2"] {
            ledger.assign("t1", agent, true, true).unwrap();
        }
        assert_eq!(ledger.len(), 1);
        assert!(ledger.is_executable("t1"));
        assert_eq!(ledger.resolve("t1").unwrap(), "a2");
        assert_eq!(
            ledger.get("t1"),
            Some(&Assignment {
                agent_name: "a2".into(),
                assigned: true
            })
        );
    }
}

use anyhow::{bail, Result};
use chrono::Utc;

use super::{Command, CommandContext};
use crate::choose_state::TASK_TYPE_KEY;
use crate::store::StoreData;
use crate::workflows::{
    Action, ActionId, HistoryId, ResourceHistoryRecord, ResourceWorkflowAssignment, StateId, Task,
    TaskConfig, TaskId, Workflow, WorkflowId, WorkflowState,
};

pub struct SeedDemoCommand {
    pub force: bool,
}

impl Command for SeedDemoCommand {
    fn execute(&self, ctx: &CommandContext) -> Result<()> {
        if !self.force && ctx.store.snapshot()? != StoreData::default() {
            bail!(
                "store {} already has content, use --force to replace it",
                ctx.store.path().display()
            );
        }

        ctx.store.initialize(demo_data())?;
        println!("🌱 Demo workflow written to {}", ctx.store.path().display());
        println!("   workflow 1 \"Demo review\": states 3 Pending, 5 Accepted, 7 Rejected");
        println!("   action 9 \"Review\" runs task 3 (always-true, ok 5, ko 7)");
        println!("   ticket#42 is Pending; history 1 records its last action");
        println!();
        println!("   Try: choose-state process --history 1 --task 3");
        Ok(())
    }
}

/// A single review workflow with one choose-state task and one pending ticket.
pub fn demo_data() -> StoreData {
    let workflow_id = WorkflowId(1);
    let state = |id, name: &str| WorkflowState {
        id: StateId(id),
        name: name.to_string(),
        workflow_id,
    };
    let pending = state(3, "Pending");

    StoreData {
        workflows: vec![Workflow {
            id: workflow_id,
            name: "Demo review".to_string(),
        }],
        actions: vec![Action {
            state_before: Some(pending.id),
            ..Action::new(ActionId(9), "Review", workflow_id).with_tasks([TaskId(3)])
        }],
        states: vec![pending.clone(), state(5, "Accepted"), state(7, "Rejected")],
        tasks: vec![Task {
            id: TaskId(3),
            action_id: ActionId(9),
            task_type: TASK_TYPE_KEY.to_string(),
        }],
        assignments: vec![ResourceWorkflowAssignment {
            resource_id: 42,
            resource_type: "ticket".to_string(),
            workflow_id,
            state: pending,
            external_parent_id: None,
        }],
        history: vec![ResourceHistoryRecord {
            id: HistoryId(1),
            resource_id: 42,
            resource_type: "ticket".to_string(),
            action_id: ActionId(9),
            workflow_id,
            created_at: Utc::now(),
            user_access_code: "demo".to_string(),
        }],
        task_configs: vec![TaskConfig {
            task_id: TaskId(3),
            controller_name: "always-true".to_string(),
            id_state_ok: Some(StateId(5)),
            id_state_ko: Some(StateId(7)),
        }],
        task_information: Vec::new(),
    }
}

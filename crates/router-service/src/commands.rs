//! Subcommands of the `router` binary.
//!
//! Each command acts on one routing scope and produces a JSON value.

use clap::{ArgAction, Subcommand};
use router_core::{EngineError, RoutingEngine};
use router_planner::editor;
use router_types::RoutingMode;
use serde_json::{json, Value};
use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
	#[error(transparent)]
	Engine(#[from] EngineError),
	#[error("Output error: {0}")]
	Output(#[from] serde_json::Error),
}

#[derive(Subcommand, Debug)]
pub enum Command {
	/// Print the stored routing config
	Show { store: String },
	/// Create an empty routing config
	Init {
		store: String,
		#[arg(long, default_value = "advanced")]
		mode: RoutingMode,
	},
	/// Add a warehouse from the directory to routing
	AddWarehouse { store: String, warehouse_id: String },
	/// Remove an assignment; its states become unassigned
	RemoveWarehouse { store: String, assignment_id: String },
	/// Move a state to a warehouse, or to unassigned when no warehouse is given
	Move {
		store: String,
		state: String,
		warehouse_id: Option<String>,
	},
	/// Auto-assign every state by proximity to warehouse home states
	Plan { store: String },
	/// Report unassigned states and partition consistency
	Check { store: String },
	/// Resolve the warehouse for a shipping address
	Resolve {
		store: String,
		state: String,
		#[arg(long)]
		country: Option<String>,
	},
	/// Change the priority of an assignment
	SetPriority {
		store: String,
		assignment_id: String,
		priority: u32,
	},
	/// Activate or deactivate an assignment
	SetActive {
		store: String,
		assignment_id: String,
		#[arg(action = ArgAction::Set)]
		active: bool,
	},
	/// Switch between simple and advanced routing
	SetMode { store: String, mode: RoutingMode },
	/// Enable or disable region routing
	SetRegionRouting {
		store: String,
		#[arg(action = ArgAction::Set)]
		enabled: bool,
	},
	/// Delete the routing config
	Reset { store: String },
}

/// Runs a command and returns its JSON output.
pub async fn run(engine: &RoutingEngine, command: Command) -> Result<Value, CommandError> {
	let output = match command {
		Command::Show { store } => serde_json::to_value(engine.routing(&store).await?)?,
		Command::Init { store, mode } => serde_json::to_value(engine.init(&store, mode).await?)?,
		Command::AddWarehouse {
			store,
			warehouse_id,
		} => serde_json::to_value(engine.add_warehouse(&store, &warehouse_id).await?)?,
		Command::RemoveWarehouse {
			store,
			assignment_id,
		} => serde_json::to_value(engine.remove_warehouse(&store, &assignment_id).await?)?,
		Command::Move {
			store,
			state,
			warehouse_id,
		} => serde_json::to_value(
			engine
				.move_state(&store, &state, warehouse_id.as_deref())
				.await?,
		)?,
		Command::Plan { store } => serde_json::to_value(engine.plan(&store).await?)?,
		Command::Check { store } => serde_json::to_value(engine.check(&store).await?)?,
		Command::Resolve {
			store,
			state,
			country,
		} => {
			let decision = engine.resolve(&store, &state, country.as_deref()).await?;
			json!({
				"storeId": store,
				"state": state,
				"decision": decision,
			})
		},
		Command::SetPriority {
			store,
			assignment_id,
			priority,
		} => serde_json::to_value(
			engine
				.edit(&store, |c| editor::set_priority(c, &assignment_id, priority))
				.await?,
		)?,
		Command::SetActive {
			store,
			assignment_id,
			active,
		} => serde_json::to_value(
			engine
				.edit(&store, |c| editor::set_active(c, &assignment_id, active))
				.await?,
		)?,
		Command::SetMode { store, mode } => serde_json::to_value(
			engine
				.edit(&store, |c| Ok(editor::set_mode(c, mode)))
				.await?,
		)?,
		Command::SetRegionRouting { store, enabled } => serde_json::to_value(
			engine
				.edit(&store, |c| Ok(editor::set_region_routing(c, enabled)))
				.await?,
		)?,
		Command::Reset { store } => {
			let removed = engine.reset(&store).await?;
			json!({ "storeId": store, "removed": removed })
		},
	};
	Ok(output)
}

#[cfg(test)]
mod tests {
	use super::*;
	use router_planner::implementations::strategies::proximity::ProximityStrategy;
	use router_planner::PlannerService;
	use router_storage::implementations::memory::MemoryStorage;
	use router_storage::StorageService;
	use std::sync::Arc;

	const CONFIG: &str = r#"
[engine]
id = "cli-test"

[storage]
primary = "memory"
[storage.implementations.memory]

[planner]
primary = "proximity"
[planner.implementations.proximity]

[[warehouses]]
id = "wh-east"
name = "Newark"
address = { state = "NJ" }

[[warehouses]]
id = "wh-west"
name = "Ontario"
address = { state = "CA" }
"#;

	fn engine() -> RoutingEngine {
		RoutingEngine::new(
			CONFIG.parse().unwrap(),
			Arc::new(StorageService::new(Box::new(MemoryStorage::new()))),
			Arc::new(PlannerService::new(Box::new(ProximityStrategy::default()))),
		)
	}

	fn store() -> String {
		"shop".to_string()
	}

	async fn setup(engine: &RoutingEngine) {
		run(engine, Command::Init { store: store(), mode: RoutingMode::Advanced })
			.await
			.unwrap();
		for id in ["wh-east", "wh-west"] {
			run(
				engine,
				Command::AddWarehouse {
					store: store(),
					warehouse_id: id.to_string(),
				},
			)
			.await
			.unwrap();
		}
		run(engine, Command::Plan { store: store() }).await.unwrap();
	}

	#[tokio::test]
	async fn test_show_outputs_versioned_document() {
		let engine = engine();
		setup(&engine).await;

		let output = run(&engine, Command::Show { store: store() }).await.unwrap();
		assert_eq!(output["version"], 4);
		assert_eq!(output["config"]["mode"], "advanced");
		assert_eq!(output["config"]["primaryWarehouseId"], "wh-east");
		assert_eq!(output["config"]["assignments"].as_array().unwrap().len(), 2);
	}

	#[tokio::test]
	async fn test_resolve_output() {
		let engine = engine();
		setup(&engine).await;

		let output = run(
			&engine,
			Command::Resolve {
				store: store(),
				state: "Nevada".into(),
				country: None,
			},
		)
		.await
		.unwrap();
		assert_eq!(output["decision"]["warehouseId"], "wh-west");

		let output = run(
			&engine,
			Command::Resolve {
				store: "other".into(),
				state: "NV".into(),
				country: Some("US".into()),
			},
		)
		.await
		.unwrap();
		assert_eq!(output["decision"]["unresolved"], true);
	}

	#[tokio::test]
	async fn test_check_after_move_to_unassigned() {
		let engine = engine();
		setup(&engine).await;

		run(
			&engine,
			Command::Move {
				store: store(),
				state: "maine".into(),
				warehouse_id: None,
			},
		)
		.await
		.unwrap();

		let output = run(&engine, Command::Check { store: store() }).await.unwrap();
		assert_eq!(output["unassignedStates"], json!(["ME"]));
		assert_eq!(output["assignedStates"], 49);
		assert!(output.get("partitionError").is_none());
	}

	#[tokio::test]
	async fn test_mode_switch_bypasses_assignments() {
		let engine = engine();
		setup(&engine).await;

		run(
			&engine,
			Command::SetMode {
				store: store(),
				mode: RoutingMode::Simple,
			},
		)
		.await
		.unwrap();
		let output = run(
			&engine,
			Command::Resolve {
				store: store(),
				state: "CA".into(),
				country: None,
			},
		)
		.await
		.unwrap();
		assert_eq!(output["decision"]["warehouseId"], "wh-east");
	}

	#[tokio::test]
	async fn test_errors_propagate() {
		let engine = engine();
		let err = run(&engine, Command::Plan { store: store() })
			.await
			.unwrap_err();
		assert!(matches!(err, CommandError::Engine(EngineError::NotFound(_))));

		setup(&engine).await;
		let err = run(
			&engine,
			Command::SetPriority {
				store: store(),
				assignment_id: "missing".into(),
				priority: 2,
			},
		)
		.await
		.unwrap_err();
		assert!(err.to_string().contains("Assignment not found"));
	}

	#[tokio::test]
	async fn test_reset() {
		let engine = engine();
		setup(&engine).await;
		let output = run(&engine, Command::Reset { store: store() }).await.unwrap();
		assert_eq!(output["removed"], true);
		assert!(run(&engine, Command::Show { store: store() }).await.is_err());
	}
}

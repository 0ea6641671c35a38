//! Hive 命令行演示
//!
//! 跑一遍 Market Research 场景：预置类型 -> 建任务 -> 建智能体 -> 分配 -> 执行，打印结果与记忆。
//! 未设置 OPENAI_API_KEY 时使用 Mock 推理引擎。

use anyhow::Context;
use hive::config::load_config;
use hive::core::{Orchestrator, TaskParams};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    hive::observability::init();

    let config_path = std::env::args().nth(1).map(std::path::PathBuf::from);
    let cfg = load_config(config_path).context("Failed to load config")?;
    tracing::info!("{} demo: Market Research", cfg.app.display_name());
    let orch = Orchestrator::from_config(&cfg);
    orch.seed_examples().await.context("Failed to seed example types")?;

    let task_id = orch
        .add_task(
            "T1",
            "Research the latest trends in AI",
            "Market Research",
        )
        .await?;
    let agent = orch.add_agent("A1", "Research Agent").await?;
    orch.assign_task(&agent, &task_id).await?;

    let mut params = TaskParams::new();
    params.insert("region".to_string(), "EU".to_string());
    let result = orch
        .execute_task(&task_id, params)
        .await
        .context("Task execution failed")?;

    println!("Task {} -> {}", task_id, agent);
    println!("Result:\n{}\n", result);
    println!("Memory of {}:", agent);
    for turn in orch.agent_memory(&agent).await? {
        println!("{}\n", turn.render());
    }
    Ok(())
}

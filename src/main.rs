use anyhow::Context;

use page_chat::config::{GatewayConfig, WorkflowConfig};
use page_chat::gateway::GatewayClient;
use page_chat::workflow::Workflow;
use page_chat::{logging, repl};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    let gateway_config = GatewayConfig::from_env().context(
        "set PAGE_CHAT_API_KEY and PAGE_CHAT_APP_ID (optionally PAGE_CHAT_BASE_URL)",
    )?;
    let workflow_config = WorkflowConfig::from_env();

    eprintln!("page-chat v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   API: {}", gateway_config.base_url);
    eprintln!("   Timeout: {}s", gateway_config.timeout.as_secs());
    eprintln!("   Agent: {}\n", workflow_config.agent_name);

    let gateway = GatewayClient::from_config(&gateway_config)?;
    let workflow = Workflow::new(gateway, workflow_config);

    repl::run(&workflow).await;
    Ok(())
}

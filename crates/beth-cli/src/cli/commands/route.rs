//! Route command handler.

use beth_chat::{KeywordRouter, Router, handoff};
use beth_core::config::Config;

pub fn run(message: &str, current: Option<&str>, config: &Config) {
    let default_agent = config.chat.default_agent.as_str();
    let router = KeywordRouter::from_config(&config.router, default_agent);
    let current = current.unwrap_or(default_agent);

    let decision = router.route(message, current);
    println!("target: {}", decision.target_agent_id);
    println!(
        "handoff: {}",
        if decision.should_handoff { "yes" } else { "no" }
    );
    println!("reason: {}", decision.reason);
    if decision.should_handoff {
        println!(
            "announcement: {}",
            handoff::handoff_message(current, &decision.target_agent_id)
        );
    }
}

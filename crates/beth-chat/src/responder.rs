//! Reply generation for agents.

use serde_json::{Value, json};

use crate::message::ChatCard;

/// What an agent says back, with an optional card.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentReply {
    pub text: String,
    pub card: Option<ChatCard>,
}

impl AgentReply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            card: None,
        }
    }

    #[must_use]
    pub fn with_card(mut self, card: ChatCard) -> Self {
        self.card = Some(card);
        self
    }
}

/// Produces an agent's reply to a user message.
///
/// Called off the session task; implementations may block briefly but must
/// not assume they run on the runtime thread.
pub trait Responder: Send + Sync {
    /// # Errors
    /// Returns an error if the agent cannot answer; the session reports it
    /// as a system message.
    fn respond(&self, agent_id: &str, user_text: &str) -> anyhow::Result<AgentReply>;
}

/// Canned demo replies for the banking team.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScriptedResponder;

impl Responder for ScriptedResponder {
    fn respond(&self, agent_id: &str, user_text: &str) -> anyhow::Result<AgentReply> {
        let text = user_text.to_lowercase();
        let mentions = |words: &[&str]| words.iter().any(|word| text.contains(word));

        let reply = match agent_id {
            "nova" if mentions(&["sarah", "$100", "send"]) => AgentReply::text(
                "I've prepared a transfer for you. Please review the details below and confirm when ready.",
            )
            .with_card(ChatCard::TransferConfirm(json!({
                "fromAccount": "Everyday Checking (****4521)",
                "toContact": "Sarah Chen",
                "amount": 100,
                "memo": "Dinner split",
                "estimatedArrival": "Instant",
            }))),
            "nova" => AgentReply::text(
                "I can help you transfer money. Just tell me who you'd like to send money to and how much. Your recent contacts are Sarah Chen, Michael Rodriguez, and David Kim.",
            ),
            "penny" if mentions(&["dining", "food", "restaurant"]) => AgentReply::text(
                "I've analyzed your dining spending. Here's a breakdown of your food expenses this month.",
            )
            .with_card(ChatCard::SpendingChart(json!({
                "category": "Dining",
                "thisMonth": 156.45,
                "lastMonth": 127.32,
                "trend": "up",
                "changePercent": 23,
                "breakdown": [
                    { "name": "Uber Eats", "amount": 34.56 },
                    { "name": "Starbucks", "amount": 7.45 },
                    { "name": "Various Restaurants", "amount": 114.44 },
                ],
            }))),
            "penny" => AgentReply::text(
                "Your total spending this month is $829.36. Your biggest categories are Shopping (29%), Groceries (24%), and Dining (19%). Would you like me to analyze any specific category?",
            )
            .with_card(ChatCard::SpendingChart(json!({
                "total": 829.36,
                "categories": [
                    { "name": "Shopping", "amount": 246.77, "percentage": 29 },
                    { "name": "Groceries", "amount": 195.07, "percentage": 24 },
                    { "name": "Dining", "amount": 156.45, "percentage": 19 },
                    { "name": "Utilities", "amount": 145.67, "percentage": 18 },
                    { "name": "Transport", "amount": 58.42, "percentage": 7 },
                    { "name": "Subscriptions", "amount": 26.98, "percentage": 3 },
                ],
            }))),
            "sentinel" if mentions(&["suspicious", "fraud", "block"]) => AgentReply::text(
                "🚨 I've detected a suspicious transaction that requires your attention. An ATM withdrawal in New York doesn't match your usual activity patterns.",
            )
            .with_card(fraud_alert_card()),
            "sentinel" => AgentReply::text(
                "Your accounts are currently secure. I'm monitoring all activity 24/7. There's one flagged transaction from January 13th that I'd like you to review. Would you like to see the details?",
            ),
            "sage" if mentions(&["save", "saving"]) => AgentReply::text(
                "Great question! Based on your income and spending patterns, I recommend setting aside $800/month. You could reach a $30,000 emergency fund by October 2026. Here are some strategies:\n\n\
                 1. **Automate savings**: Set up a $200/week transfer to your High-Yield Savings\n\
                 2. **Reduce dining out**: Cutting back 20% saves $31/month\n\
                 3. **Review subscriptions**: You have 2 subscriptions totaling $27/month\n\n\
                 Would you like me to set up automated savings?",
            ),
            "sage" if mentions(&["invest"]) => AgentReply::text(
                "With your current savings rate and risk tolerance, I'd suggest a balanced approach:\n\n\
                 📈 **Investment Allocation**\n\
                 - 60% Index Funds (S&P 500, Total Market)\n\
                 - 25% Bonds (for stability)\n\
                 - 15% Growth stocks (tech, innovation)\n\n\
                 Your emergency fund ($24,680) covers 6 months of expenses, so you're ready to start investing! Want me to explain any of these options in detail?",
            ),
            "sage" => AgentReply::text(
                "I'm here to help with your financial goals. Based on your accounts, you have a healthy savings balance and manageable credit card usage. What would you like to work on - saving more, investing, or paying down debt faster?",
            ),
            _ => AgentReply::text(
                "I understand your request. Let me connect you with the right specialist. Based on what you're asking about, I think one of my colleagues can help you better.",
            ),
        };
        Ok(reply)
    }
}

/// The flagged ATM withdrawal shown by Sentinel.
pub fn fraud_alert_card() -> ChatCard {
    ChatCard::FraudAlert(fraud_alert_data())
}

fn fraud_alert_data() -> Value {
    json!({
        "transactionId": "txn-014",
        "type": "ATM Withdrawal",
        "amount": 500,
        "location": "New York, NY",
        "date": "2026-01-13",
        "riskLevel": "high",
        "reason": "Unusual location - you were in San Francisco on this date",
        "actions": ["Block Card", "Report as Fraud", "This Was Me"],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn respond(agent: &str, text: &str) -> AgentReply {
        ScriptedResponder.respond(agent, text).unwrap()
    }

    #[test]
    fn test_nova_prepares_transfer() {
        let reply = respond("nova", "Send $100 to Sarah");
        let Some(ChatCard::TransferConfirm(data)) = reply.card else {
            panic!("expected transfer card, got {:?}", reply.card);
        };
        assert_eq!(data["toContact"], "Sarah Chen");
        assert_eq!(data["amount"], 100);

        assert!(respond("nova", "hello").card.is_none());
    }

    #[test]
    fn test_penny_always_charts() {
        let dining = respond("penny", "What about restaurants?");
        assert_eq!(dining.card.as_ref().map(ChatCard::kind), Some("spending-chart"));
        assert_eq!(dining.card.unwrap().data()["category"], "Dining");

        let overview = respond("penny", "show my spending");
        assert_eq!(overview.card.unwrap().data()["total"], 829.36);
    }

    #[test]
    fn test_sentinel_fraud_card() {
        let reply = respond("sentinel", "block my card");
        assert_eq!(reply.card, Some(fraud_alert_card()));
        assert!(respond("sentinel", "status?").card.is_none());
    }

    #[test]
    fn test_sage_topics() {
        assert!(respond("sage", "How do I save more?").text.contains("$800/month"));
        assert!(respond("sage", "Should I invest?").text.contains("Investment Allocation"));
        assert!(respond("sage", "hi").text.starts_with("I'm here to help"));
    }

    #[test]
    fn test_unknown_agent_gets_orchestrator_reply() {
        assert_eq!(
            respond("atlas", "hi").text,
            respond("developer", "hi").text
        );
    }
}

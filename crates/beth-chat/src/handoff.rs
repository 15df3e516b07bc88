//! Scripted handoff announcements.

/// Text the outgoing agent says when passing the conversation on.
const HANDOFF_LINES: [(&str, &str, &str); 16] = [
    (
        "atlas",
        "nova",
        "I'll connect you with Nova, our transfers specialist. She'll help you send money quickly and securely.",
    ),
    (
        "atlas",
        "penny",
        "Let me bring in Penny, our spending analyst. She's great at breaking down where your money goes.",
    ),
    (
        "atlas",
        "sentinel",
        "I'm routing you to Sentinel, our security expert. They'll help keep your accounts safe.",
    ),
    (
        "atlas",
        "sage",
        "I'll introduce you to Sage, our financial advisor. They can help you plan for the future.",
    ),
    (
        "nova",
        "penny",
        "Handing you off to Penny for spending analysis. She'll give you the detailed breakdown you need.",
    ),
    (
        "nova",
        "sentinel",
        "I'm connecting you with Sentinel for security matters. Your safety comes first.",
    ),
    (
        "nova",
        "sage",
        "Let me transfer you to Sage for financial advice. They're the expert on long-term planning.",
    ),
    (
        "penny",
        "nova",
        "Connecting you to Nova for your transfer needs. She'll get that money moving!",
    ),
    (
        "penny",
        "sentinel",
        "I'm bringing in Sentinel to review security concerns. They've got you covered.",
    ),
    (
        "penny",
        "sage",
        "Transferring you to Sage for advice. They can help turn these insights into action.",
    ),
    (
        "sentinel",
        "nova",
        "Routing to Nova for transfer assistance. She'll handle it securely.",
    ),
    (
        "sentinel",
        "penny",
        "Connecting you to Penny to review your spending patterns.",
    ),
    (
        "sentinel",
        "sage",
        "Handing off to Sage for financial guidance.",
    ),
    (
        "sage",
        "nova",
        "Let me connect you with Nova for that transfer.",
    ),
    (
        "sage",
        "penny",
        "Bringing in Penny to analyze your spending in detail.",
    ),
    (
        "sage",
        "sentinel",
        "Connecting you to Sentinel for security review.",
    ),
];

/// Announcement for a handoff from `from` to `to`.
///
/// Pairs outside the built-in table get a generic line naming `to`.
pub fn handoff_message(from: &str, to: &str) -> String {
    HANDOFF_LINES
        .iter()
        .find(|(f, t, _)| *f == from && *t == to)
        .map_or_else(
            || format!("Transferring you to {to} for specialized assistance."),
            |(_, _, line)| (*line).to_string(),
        )
}

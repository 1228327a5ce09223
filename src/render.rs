//! HTML fragments for chat messages.
//!
//! Every member of a room renders the same [`GroupMessage`] with its own
//! identity, so the author sees an "own" bubble while everyone else sees
//! the author's name next to the text.

use maud::{Markup, html};

use crate::domain::{GroupMessage, UserIdentity};

/// Renders `message` as seen by `recipient`.
#[must_use]
pub fn render_message(message: &GroupMessage, recipient: &UserIdentity) -> Markup {
    let own = recipient
        .user()
        .is_some_and(|user| message.is_authored_by(user));
    let class = if own { "chat-message own" } else { "chat-message" };

    html! {
        li class=(class) id={ "message-" (message.id.get()) } data-author=(message.author.id) {
            @if !own {
                span class="author" { (message.author.username) }
            }
            p class="body" { (message.body) }
            time datetime=(message.created_at.to_rfc3339()) {
                (message.created_at.format("%H:%M").to_string())
            }
        }
    }
}

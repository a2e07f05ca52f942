//! Bootstrap script injected into the embedded context.
//!
//! The renderer offers no reliable "ready" signal, so the host re-injects this
//! script on every load-progress tick. The script guards itself with a
//! sentinel flag on `window` and returns immediately once installed.
//!
//! Once installed it:
//!
//! 1. Exposes `window.__VTTLINK__.sendChat(text)`, which tries the document
//!    API (`ChatMessage.create`) and then the UI singleton
//!    (`ui.chat.submitMessage`), logging when neither exists.
//! 2. Subscribes to the `createChatMessage` and `renderChatMessage` hooks. If
//!    the hook system is not initialized yet it retries every
//!    [`HOOK_RETRY_DELAY`] until the page is hidden.
//! 3. Forwards each chat message to the host as a JSON
//!    [`crate::BridgeNotification`] via [`HOST_ENTRY_POINT`]. Both hooks fire
//!    for the same message, so forwarding is keyed by message id and happens
//!    once per id; messages without an id are forwarded on every firing.
//!    Exceptions are caught and logged inside the page, never propagated.

use std::time::Duration;

/// Global flag set by the first successful installation.
pub const SENTINEL: &str = "__VTTLINK_BRIDGE_INSTALLED__";

/// Namespace object on `window` carrying the outbound entry point.
pub const BRIDGE_NAMESPACE: &str = "__VTTLINK__";

/// Host-provided function receiving serialized notifications.
pub const HOST_ENTRY_POINT: &str = "window.ipc.postMessage";

/// Hook that fires when the embedded client creates a chat document.
pub const CREATE_HOOK: &str = "createChatMessage";

/// Hook that fires when the embedded client renders a chat message.
pub const RENDER_HOOK: &str = "renderChatMessage";

/// Fixed delay between attempts to subscribe to the hook system.
pub const HOOK_RETRY_DELAY: Duration = Duration::from_millis(1500);

/// The idempotent initialization script.
pub const BOOTSTRAP_SCRIPT: &str = r"(function () {
  if (window.__VTTLINK_BRIDGE_INSTALLED__) return;
  window.__VTTLINK_BRIDGE_INSTALLED__ = true;

  var bridge = window.__VTTLINK__ = window.__VTTLINK__ || {};
  bridge.disposed = false;
  window.addEventListener('pagehide', function () { bridge.disposed = true; });

  bridge.sendChat = function (text) {
    try {
      if (typeof ChatMessage !== 'undefined' && ChatMessage.create) {
        ChatMessage.create({ content: text });
      } else if (window.ui && ui.chat && ui.chat.submitMessage) {
        ui.chat.submitMessage({ content: text });
      } else {
        console.warn('vttlink: no chat entry point available');
      }
    } catch (e) {
      console.error('vttlink: sendChat failed', e);
    }
  };

  function notifyHost(author, content, ts) {
    try {
      if (window.ipc && window.ipc.postMessage) {
        window.ipc.postMessage(JSON.stringify({
          type: 'chatMessage',
          author: String(author || 'Unknown'),
          content: String(content || ''),
          timestamp: Math.floor(Number(ts)) || Date.now()
        }));
      }
    } catch (e) {
      console.error('vttlink: host dispatch failed', e);
    }
  }

  var forwarded = {};
  function forwardOnce(id, author, content, ts) {
    if (id) {
      if (forwarded[id]) return;
      forwarded[id] = true;
    }
    notifyHost(author, content, ts);
  }

  function wireHooks() {
    if (bridge.disposed) return;
    try {
      if (window.Hooks && Hooks.on) {
        Hooks.on('createChatMessage', function (doc) {
          try {
            var game = window.game;
            var user = (game && game.users && game.users.get(doc.user)) || (game && game.user);
            forwardOnce(doc.id, (user && user.name) || 'User', doc.content, doc.timestamp || Date.now());
          } catch (e) { console.error('vttlink: createChatMessage', e); }
        });
        Hooks.on('renderChatMessage', function (msg, html, data) {
          try {
            var message = (data && data.message) || {};
            var author = (message.speaker && message.speaker.alias) || (data && data.user && data.user.name) || 'User';
            forwardOnce((msg && msg.id) || message._id, author, message.content || '', Date.now());
          } catch (e) { console.error('vttlink: renderChatMessage', e); }
        });
        return;
      }
    } catch (e) {
      console.error('vttlink: hook wiring failed', e);
    }
    setTimeout(wireHooks, 1500);
  }
  wireHooks();
})();
";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_references_protocol_constants() {
        for name in [SENTINEL, BRIDGE_NAMESPACE, HOST_ENTRY_POINT, CREATE_HOOK, RENDER_HOOK] {
            assert!(BOOTSTRAP_SCRIPT.contains(name), "bootstrap script missing {name}");
        }
    }

    #[test]
    fn retry_delay_matches_script() {
        let delay = format!("setTimeout(wireHooks, {});", HOOK_RETRY_DELAY.as_millis());
        assert!(BOOTSTRAP_SCRIPT.contains(&delay));
    }

    #[test]
    fn both_hooks_forward_through_id_dedupe() {
        assert_eq!(BOOTSTRAP_SCRIPT.matches("forwardOnce(").count(), 3);
        assert!(BOOTSTRAP_SCRIPT.contains("forwardOnce(doc.id,"));
        assert!(BOOTSTRAP_SCRIPT.contains("if (forwarded[id]) return;"));
    }

    #[test]
    fn sentinel_guard_runs_first() {
        let guard = BOOTSTRAP_SCRIPT.find(&format!("if (window.{SENTINEL}) return;"));
        let set = BOOTSTRAP_SCRIPT.find(&format!("window.{SENTINEL} = true;"));
        let namespace = BOOTSTRAP_SCRIPT.find(&format!("window.{BRIDGE_NAMESPACE} ="));
        assert!(guard < set && set < namespace);
        assert!(guard.is_some());
    }
}

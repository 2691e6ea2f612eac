// ── Command API ──
//
// Every state-changing request flows through a `Command`, queued on the
// client's channel and executed one at a time by the command processor.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use futures_util::FutureExt;
use futures_util::future::{self, BoxFuture};
use tokio::sync::oneshot;

use crate::error::CoreError;
use crate::model::{OperationResult, Selector, StateChange};
use crate::store::OptimisticUpdate;

/// A write operation against the lighting service.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    SetState {
        selector: Selector,
        change: StateChange,
        duration: Duration,
    },
    ActivateScene {
        selector: Selector,
        duration: Duration,
    },
}

impl Command {
    pub fn selector(&self) -> &Selector {
        match self {
            Self::SetState { selector, .. } | Self::ActivateScene { selector, .. } => selector,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SetState { selector, .. } => write!(f, "set_state({selector})"),
            Self::ActivateScene { selector, .. } => write!(f, "activate_scene({selector})"),
        }
    }
}

pub(crate) type CommandResponse = Result<Vec<OperationResult>, CoreError>;

/// A queued command, the optimistic update it caused, and the channel
/// its outcome is delivered on.
pub(crate) struct CommandEnvelope {
    pub command: Command,
    pub optimistic: OptimisticUpdate,
    pub response_tx: oneshot::Sender<CommandResponse>,
}

/// Completion of a submitted command.
///
/// Resolves once the service responds. The optimistic update is already
/// visible when this is returned; dropping the handle does not cancel
/// the command.
#[must_use = "the command runs regardless; await the handle to observe its outcome"]
pub struct CommandHandle {
    inner: BoxFuture<'static, CommandResponse>,
}

impl CommandHandle {
    pub(crate) fn from_receiver(rx: oneshot::Receiver<CommandResponse>) -> Self {
        Self {
            inner: rx
                .map(|res| res.unwrap_or(Err(CoreError::ClientClosed)))
                .boxed(),
        }
    }

    /// A handle that is already complete.
    pub(crate) fn ready(result: CommandResponse) -> Self {
        Self {
            inner: future::ready(result).boxed(),
        }
    }

    /// Wait for every handle, concatenating results in order. The first
    /// error wins, but every command still runs to completion.
    pub(crate) fn join(handles: Vec<CommandHandle>) -> Self {
        let inner = future::join_all(handles).map(|outcomes| {
            let mut results = Vec::new();
            for outcome in outcomes {
                results.extend(outcome?);
            }
            Ok(results)
        });
        Self {
            inner: inner.boxed(),
        }
    }
}

impl Future for CommandHandle {
    type Output = CommandResponse;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.inner.as_mut().poll(cx)
    }
}

impl fmt::Debug for CommandHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandHandle").finish_non_exhaustive()
    }
}

//! Coach session: the goal coach's transcript plus the transient proposal
//! slot.
//!
//! The coach transcript is never persisted -- only accepted proposals
//! leave a durable trace, as goals in the ledger.

use tracing::info;

use creo_types::chat::Message;
use creo_types::error::{ChatError, GoalError};
use creo_types::goal::{Goal, GoalProposal};

use crate::chat::exchange::ExchangeFactory;
use crate::chat::transcript::{RejectReason, SubmitOutcome, TranscriptController};
use crate::coach::proposal::extract_proposal;
use crate::goal::ledger::GoalLedger;
use crate::prompts::{COACH_WELCOME, RETARGET_WELCOME};
use crate::storage::StorageBackend;

/// Outcome of one coach turn.
#[derive(Debug, Clone, PartialEq)]
pub enum CoachTurn {
    /// The coach replied; `text` is the display copy with any embedded
    /// proposal stripped out.
    Replied {
        text: String,
        proposal_surfaced: bool,
    },
    /// The submission was a no-op.
    Rejected(RejectReason),
    /// The session was restarted while the reply streamed.
    Abandoned,
}

/// The goal coach's session controller.
pub struct CoachSession<F: ExchangeFactory> {
    controller: TranscriptController<F>,
    proposed: Option<GoalProposal>,
}

impl<F: ExchangeFactory> CoachSession<F> {
    /// Create a coach session with the canonical coach welcome.
    pub fn new(factory: F) -> Self {
        Self {
            controller: TranscriptController::new(factory, COACH_WELCOME),
            proposed: None,
        }
    }

    /// The coach transcript.
    pub fn transcript(&self) -> Vec<Message> {
        self.controller.transcript()
    }

    /// The pending proposal, if the last replies surfaced one.
    pub fn proposal(&self) -> Option<&GoalProposal> {
        self.proposed.as_ref()
    }

    /// Drop the pending proposal without accepting it.
    pub fn discard_proposal(&mut self) {
        self.proposed = None;
    }

    /// Restart with a fresh exchange and the canonical welcome. Discards
    /// any pending proposal.
    pub fn restart(&mut self) {
        self.controller.reset();
        self.proposed = None;
    }

    /// Restart seeded with a context message (e.g. right after a completed
    /// goal was archived): swaps the welcome line and immediately submits
    /// the context text.
    pub async fn restart_with_context(&mut self, context: &str) -> Result<CoachTurn, ChatError> {
        self.controller.reset_with_welcome(RETARGET_WELCOME);
        self.proposed = None;
        self.send(context).await
    }

    /// Submit a message to the coach.
    pub async fn send(&mut self, text: &str) -> Result<CoachTurn, ChatError> {
        self.send_with(text, |_| {}).await
    }

    /// Submit with a streaming patch observer.
    ///
    /// After natural completion the finalized reply is scanned for an
    /// embedded proposal; when one parses, the transcript's display copy
    /// of the reply is replaced with the stripped text and the proposal
    /// becomes pending (replacing any previous one).
    pub async fn send_with<P>(&mut self, text: &str, on_patch: P) -> Result<CoachTurn, ChatError>
    where
        P: FnMut(&str) + Send,
    {
        let outcome = self.controller.submit_with(text, on_patch).await?;

        match outcome {
            SubmitOutcome::Completed(transcript) => {
                let reply = transcript.last().expect("completed transcript is non-empty");
                let (display, proposal) = extract_proposal(&reply.text);
                let surfaced = proposal.is_some();
                if let Some(proposal) = proposal {
                    self.controller.set_message_text(reply.id, &display);
                    info!(title = %proposal.title, "coach surfaced a goal proposal");
                    self.proposed = Some(proposal);
                }
                Ok(CoachTurn::Replied {
                    text: display,
                    proposal_surfaced: surfaced,
                })
            }
            SubmitOutcome::Rejected(reason) => Ok(CoachTurn::Rejected(reason)),
            SubmitOutcome::Abandoned => Ok(CoachTurn::Abandoned),
        }
    }

    /// Commit the pending proposal to the ledger as a new goal.
    ///
    /// Returns Ok(None) when no proposal is pending. The proposal is only
    /// discarded once the goal was actually created.
    pub async fn accept_proposal<S: StorageBackend>(
        &mut self,
        ledger: &mut GoalLedger<S>,
    ) -> Result<Option<Goal>, GoalError> {
        let Some(proposal) = self.proposed.clone() else {
            return Ok(None);
        };
        let goal = ledger.create(proposal.into_draft()).await?;
        self.proposed = None;
        Ok(Some(goal))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::pin::Pin;

    use futures_util::Stream;

    use creo_types::error::ExchangeError;
    use creo_types::goal::Platform;

    use crate::chat::exchange::ChatExchange;
    use crate::storage::MemoryStorage;

    /// Replies with a fixed script regardless of input.
    struct FixedExchange {
        reply: String,
    }

    impl ChatExchange for FixedExchange {
        fn send_message_stream(
            &self,
            _text: &str,
        ) -> Pin<Box<dyn Stream<Item = Result<String, ExchangeError>> + Send + 'static>> {
            Box::pin(futures_util::stream::iter(vec![Ok(self.reply.clone())]))
        }
    }

    struct FixedFactory {
        reply: String,
    }

    impl ExchangeFactory for FixedFactory {
        type Exchange = FixedExchange;

        fn create(&self, _history: &[Message]) -> FixedExchange {
            FixedExchange {
                reply: self.reply.clone(),
            }
        }
    }

    const PROPOSAL_REPLY: &str = "Let's lock it in.\nGOAL_PROPOSAL: {\"title\":\"Hit 10k\",\"platform\":\"Instagram\",\"targetValue\":10000,\"unit\":\"Followers\"}";

    fn coach_with_reply(reply: &str) -> CoachSession<FixedFactory> {
        CoachSession::new(FixedFactory {
            reply: reply.to_string(),
        })
    }

    #[tokio::test]
    async fn test_plain_reply_has_no_proposal() {
        let mut coach = coach_with_reply("Which platform are we focusing on?");
        let turn = coach.send("help me grow").await.unwrap();

        assert_eq!(
            turn,
            CoachTurn::Replied {
                text: "Which platform are we focusing on?".to_string(),
                proposal_surfaced: false,
            }
        );
        assert!(coach.proposal().is_none());
    }

    #[tokio::test]
    async fn test_proposal_reply_surfaces_and_cleans_display() {
        let mut coach = coach_with_reply(PROPOSAL_REPLY);
        let turn = coach.send("ready for a goal").await.unwrap();

        let CoachTurn::Replied {
            text,
            proposal_surfaced,
        } = turn
        else {
            panic!("expected a reply");
        };
        assert!(proposal_surfaced);
        assert_eq!(text, "Let's lock it in.");

        let proposal = coach.proposal().unwrap();
        assert_eq!(proposal.target_value, 10000.0);
        assert_eq!(proposal.platform, Platform::Instagram);

        // The transcript's display copy was cleaned in place.
        let transcript = coach.transcript();
        assert_eq!(transcript.last().unwrap().text, "Let's lock it in.");
    }

    #[tokio::test]
    async fn test_accept_proposal_creates_goal_and_clears_slot() {
        let mut coach = coach_with_reply(PROPOSAL_REPLY);
        coach.send("go").await.unwrap();

        let mut ledger = GoalLedger::load(MemoryStorage::new()).await.unwrap();
        let goal = coach.accept_proposal(&mut ledger).await.unwrap().unwrap();

        assert_eq!(goal.title, "Hit 10k");
        assert_eq!(goal.current_value, 0.0);
        assert!(coach.proposal().is_none());
        assert_eq!(ledger.goals().len(), 1);
    }

    #[tokio::test]
    async fn test_accept_without_proposal_is_noop() {
        let mut coach = coach_with_reply("no proposal here");
        let mut ledger = GoalLedger::load(MemoryStorage::new()).await.unwrap();
        assert!(coach.accept_proposal(&mut ledger).await.unwrap().is_none());
        assert!(ledger.goals().is_empty());
    }

    #[tokio::test]
    async fn test_restart_discards_proposal() {
        let mut coach = coach_with_reply(PROPOSAL_REPLY);
        coach.send("go").await.unwrap();
        assert!(coach.proposal().is_some());

        coach.restart();
        assert!(coach.proposal().is_none());
        assert_eq!(coach.transcript().len(), 1);
        assert_eq!(coach.transcript()[0].text, COACH_WELCOME);
    }

    #[tokio::test]
    async fn test_restart_with_context_swaps_welcome_and_sends() {
        let mut coach = coach_with_reply("Congrats! What's next?");
        let turn = coach
            .restart_with_context("I just hit my YouTube goal")
            .await
            .unwrap();

        assert!(matches!(turn, CoachTurn::Replied { .. }));
        let transcript = coach.transcript();
        assert_eq!(transcript[0].text, RETARGET_WELCOME);
        assert_eq!(transcript[1].text, "I just hit my YouTube goal");
        assert_eq!(transcript.len(), 3);
    }
}

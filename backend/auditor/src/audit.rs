//! Campaign ledger replay.
//!
//! Folds one campaign's stored events, in emission order, through the same
//! state machine the contract enforces and reports every event the contract
//! should never have been able to emit.

use std::collections::HashMap;

use serde::Serialize;

use crate::events::{CampaignStatus, EventKind, EventRecord};

/// Something in a campaign's event history that the escrow rules forbid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Violation {
    EventBeforeCreation {
        event_id: String,
    },
    DuplicateCreation {
        event_id: String,
    },
    MalformedAmount {
        event_id: String,
    },
    MissingActor {
        event_id: String,
    },
    FundingAfterFinalization {
        event_id: String,
    },
    TotalMismatch {
        event_id: String,
        replayed: i128,
        reported: i128,
    },
    DoubleFinalization {
        event_id: String,
    },
    OutcomeMismatch {
        event_id: String,
        expected: CampaignStatus,
        reported: Option<CampaignStatus>,
    },
    NotResearcher {
        event_id: String,
        actor: Option<String>,
    },
    WithdrawalNotAllowed {
        event_id: String,
        status: CampaignStatus,
    },
    WithdrawalAmountMismatch {
        event_id: String,
        escrowed: i128,
        withdrawn: i128,
    },
    RefundNotAllowed {
        event_id: String,
        status: CampaignStatus,
    },
    RefundMismatch {
        event_id: String,
        backer: Option<String>,
        contributed: i128,
        refunded: i128,
    },
    UpdateNotAllowed {
        event_id: String,
        status: CampaignStatus,
    },
}

/// The replayed view of one campaign.
#[derive(Debug, Clone, Serialize)]
pub struct AuditReport {
    pub campaign_id: i64,
    /// `None` when no creation event was seen.
    pub state: Option<CampaignStatus>,
    pub funding_goal: i128,
    pub total_funded: i128,
    pub escrow_balance: i128,
    pub backer_count: u32,
    pub events_replayed: usize,
    pub violations: Vec<Violation>,
    pub clean: bool,
}

#[derive(Default)]
struct Replay {
    status: Option<CampaignStatus>,
    researcher: Option<String>,
    funding_goal: i128,
    total_funded: i128,
    escrow_balance: i128,
    contributions: HashMap<String, i128>,
    violations: Vec<Violation>,
}

/// Replay `events` (already ordered by ledger) for `campaign_id`.
pub fn replay(campaign_id: i64, events: &[EventRecord]) -> AuditReport {
    let mut replay = Replay::default();
    for event in events {
        replay.apply(event);
    }

    AuditReport {
        campaign_id,
        state: replay.status,
        funding_goal: replay.funding_goal,
        total_funded: replay.total_funded,
        escrow_balance: replay.escrow_balance,
        backer_count: replay.contributions.len() as u32,
        events_replayed: events.len(),
        clean: replay.violations.is_empty(),
        violations: replay.violations,
    }
}

impl Replay {
    fn apply(&mut self, event: &EventRecord) {
        let event_id = event.event_id.clone();
        let kind = event.kind();

        if kind == EventKind::Unknown {
            return;
        }

        let status = match (self.status, kind) {
            (None, EventKind::CampaignCreated) => {
                self.status = Some(CampaignStatus::Open);
                self.researcher = event.actor.clone();
                match event.amount_value() {
                    Some(goal) => self.funding_goal = goal,
                    None => self.violations.push(Violation::MalformedAmount { event_id }),
                }
                return;
            }
            (Some(_), EventKind::CampaignCreated) => {
                self.violations
                    .push(Violation::DuplicateCreation { event_id });
                return;
            }
            (None, _) => {
                self.violations
                    .push(Violation::EventBeforeCreation { event_id });
                return;
            }
            (Some(status), _) => status,
        };

        match kind {
            EventKind::CampaignFunded => self.funded(event, status),
            EventKind::CampaignFinalized => self.finalized(event, status),
            EventKind::FundsWithdrawn => self.withdrawn(event, status),
            EventKind::RefundClaimed => self.refunded(event, status),
            EventKind::ResearchUpdate => {
                self.check_researcher(event);
                if !matches!(status, CampaignStatus::Open | CampaignStatus::Successful) {
                    self.violations
                        .push(Violation::UpdateNotAllowed { event_id, status });
                }
            }
            EventKind::CampaignCreated | EventKind::Unknown => {}
        }
    }

    fn funded(&mut self, event: &EventRecord, status: CampaignStatus) {
        let event_id = event.event_id.clone();
        if status != CampaignStatus::Open {
            self.violations
                .push(Violation::FundingAfterFinalization { event_id });
            return;
        }
        let Some(amount) = event.amount_value().filter(|a| *a > 0) else {
            self.violations.push(Violation::MalformedAmount { event_id });
            return;
        };

        let Some(backer) = event.actor.clone() else {
            self.violations.push(Violation::MissingActor { event_id });
            return;
        };

        self.total_funded = self.total_funded.saturating_add(amount);
        self.escrow_balance = self.escrow_balance.saturating_add(amount);
        let contributed = self.contributions.entry(backer).or_insert(0);
        *contributed = contributed.saturating_add(amount);

        self.check_total(event_id, event.detail.as_deref());
    }

    fn finalized(&mut self, event: &EventRecord, status: CampaignStatus) {
        let event_id = event.event_id.clone();
        if status != CampaignStatus::Open {
            self.violations
                .push(Violation::DoubleFinalization { event_id });
            return;
        }

        let expected = if self.total_funded >= self.funding_goal {
            CampaignStatus::Successful
        } else {
            CampaignStatus::Failed
        };
        let reported = event.detail.as_deref().and_then(CampaignStatus::from_stored);
        if reported != Some(expected) {
            self.violations.push(Violation::OutcomeMismatch {
                event_id: event_id.clone(),
                expected,
                reported,
            });
        }
        // Continue from what the chain says happened so later events are
        // judged against the recorded outcome.
        self.status = Some(reported.unwrap_or(expected));

        self.check_total(event_id, event.amount.as_deref());
    }

    fn withdrawn(&mut self, event: &EventRecord, status: CampaignStatus) {
        let event_id = event.event_id.clone();
        self.check_researcher(event);
        if status != CampaignStatus::Successful {
            self.violations
                .push(Violation::WithdrawalNotAllowed { event_id, status });
            return;
        }
        let Some(amount) = event.amount_value() else {
            self.violations.push(Violation::MalformedAmount { event_id });
            return;
        };
        if amount != self.escrow_balance {
            self.violations.push(Violation::WithdrawalAmountMismatch {
                event_id,
                escrowed: self.escrow_balance,
                withdrawn: amount,
            });
        }
        self.escrow_balance = self.escrow_balance.saturating_sub(amount);
        self.status = Some(CampaignStatus::PaidOut);
    }

    fn refunded(&mut self, event: &EventRecord, status: CampaignStatus) {
        let event_id = event.event_id.clone();
        if status != CampaignStatus::Failed {
            self.violations
                .push(Violation::RefundNotAllowed { event_id, status });
            return;
        }
        let Some(amount) = event.amount_value() else {
            self.violations.push(Violation::MalformedAmount { event_id });
            return;
        };

        let Some(backer) = event.actor.clone() else {
            self.violations.push(Violation::MissingActor { event_id });
            return;
        };
        let contributed = self.contributions.get(&backer).copied().unwrap_or(0);
        if amount != contributed {
            self.violations.push(Violation::RefundMismatch {
                event_id,
                backer: event.actor.clone(),
                contributed,
                refunded: amount,
            });
        }
        // A refund zeroes the backer's slot and comes off the campaign total.
        if let Some(entry) = self.contributions.get_mut(&backer) {
            *entry = 0;
        }
        self.total_funded = self.total_funded.saturating_sub(amount);
        self.escrow_balance = self.escrow_balance.saturating_sub(amount);
    }

    fn check_researcher(&mut self, event: &EventRecord) {
        if event.actor != self.researcher {
            self.violations.push(Violation::NotResearcher {
                event_id: event.event_id.clone(),
                actor: event.actor.clone(),
            });
        }
    }

    fn check_total(&mut self, event_id: String, reported: Option<&str>) {
        let Some(reported) = reported.and_then(|r| r.parse::<i128>().ok()) else {
            return;
        };
        if reported != self.total_funded {
            self.violations.push(Violation::TotalMismatch {
                event_id,
                replayed: self.total_funded,
                reported,
            });
        }
    }
}

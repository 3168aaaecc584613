//! Single-consumer sequencer
//!
//! Producers build entries and push them onto a bounded FIFO channel.
//! Exactly one `Sequencer` drains that channel, stamps each entry with
//! its region sequence id, and hands it to an `EntrySink`.
//!
//! Ordering:
//! - A producer takes the next txid and sends under one lock, so channel
//!   order equals txid order across all producers
//! - The sequencer stamps in channel order, so sequence ids follow txids
//! - Only the sequencer ever stamps; entries need no lock of their own
//!
//! Failure:
//! - Allocation failure or out-of-order delivery is fatal to the write
//!   attempt and returns the entry unstamped
//! - A sink failure returns the entry stamped; requeueing it reuses the
//!   same sequence id
//! - `Sequencer::requeue` puts a rejected entry ahead of everything still
//!   on the channel, so a retry never lands behind a later txid

use std::collections::VecDeque;
use std::sync::mpsc::{self, Receiver, SyncSender};
use std::sync::{Arc, Mutex, PoisonError};

use super::accounting::SequenceIdAccounting;
use super::config::SequencerConfig;
use super::edit::WalEdit;
use super::entry::{PendingEntry, SequenceSource, Stamped, WalEntry};
use super::errors::{Rejected, SequenceError, SequenceResult};
use super::key::WalKey;
use super::region::RegionInfo;
use super::sink::EntrySink;
use crate::mvcc::{MvccAllocator, SequenceId};
use crate::observability::{Event, Logger, SequencerMetrics, Severity};

/// Producer handle onto the sequencer's transport. Cheap to clone; every
/// clone shares the txid counter.
#[derive(Clone)]
pub struct EntryProducer {
    sender: SyncSender<PendingEntry>,
    /// Last txid handed out; held across the send.
    last_txid: Arc<Mutex<u64>>,
    metrics: Arc<SequencerMetrics>,
}

impl EntryProducer {
    /// Build an entry for `edit` and enqueue it.
    ///
    /// Returns the txid the entry was given. Blocks while the transport is
    /// full.
    pub fn append(
        &self,
        key: WalKey,
        edit: WalEdit,
        region: Arc<RegionInfo>,
        in_memstore: bool,
    ) -> SequenceResult<u64> {
        let mut last_txid = self.last_txid.lock().unwrap_or_else(PoisonError::into_inner);
        let txid = *last_txid + 1;
        let entry = WalEntry::new(txid, key, edit, region, in_memstore);
        self.sender
            .send(PendingEntry::Unstamped(entry))
            .map_err(|_| SequenceError::TransportClosed)?;
        *last_txid = txid;
        self.metrics.increment_enqueued();
        Ok(txid)
    }
}

/// The consumer: stamps entries one at a time in arrival order.
pub struct Sequencer {
    config: SequencerConfig,
    receiver: Receiver<PendingEntry>,
    /// Rejected entries waiting for a retry; drained before the channel.
    held_back: VecDeque<PendingEntry>,
    mvcc: Option<Arc<dyn MvccAllocator>>,
    accounting: Arc<SequenceIdAccounting>,
    metrics: Arc<SequencerMetrics>,
    logger: Logger,
    /// Txid of the last fresh entry stamped.
    last_txid: Option<u64>,
}

impl Sequencer {
    /// Create a transport and the sequencer draining it.
    ///
    /// Without an allocator every entry is sequenced as
    /// `SequenceId::NONE` unless its key carries a pre-assigned handle.
    pub fn channel(
        config: SequencerConfig,
        mvcc: Option<Arc<dyn MvccAllocator>>,
    ) -> SequenceResult<(EntryProducer, Sequencer)> {
        config.validate()?;
        let (sender, receiver) = mpsc::sync_channel(config.queue_capacity);
        let metrics = Arc::new(SequencerMetrics::new());
        let logger = if config.log_events {
            Logger::console().with_min_severity(Severity::Trace)
        } else {
            Logger::disabled()
        };

        let producer = EntryProducer {
            sender,
            last_txid: Arc::new(Mutex::new(0)),
            metrics: Arc::clone(&metrics),
        };
        let sequencer = Sequencer {
            config,
            receiver,
            held_back: VecDeque::new(),
            mvcc,
            accounting: Arc::new(SequenceIdAccounting::new()),
            metrics,
            logger,
            last_txid: None,
        };
        Ok((producer, sequencer))
    }

    /// Replace the logger.
    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = logger;
        self
    }

    /// Share an existing accounting table instead of a private one.
    pub fn with_accounting(mut self, accounting: Arc<SequenceIdAccounting>) -> Self {
        self.accounting = accounting;
        self
    }

    pub fn config(&self) -> &SequencerConfig {
        &self.config
    }

    pub fn accounting(&self) -> Arc<SequenceIdAccounting> {
        Arc::clone(&self.accounting)
    }

    pub fn metrics(&self) -> Arc<SequencerMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Highest sequence id appended for `region`.
    pub fn highest_sequence_id(&self, region: &RegionInfo) -> SequenceId {
        self.accounting.highest_sequence_id(region.encoded_name())
    }

    /// Txid of the last fresh entry stamped, if any.
    pub fn last_txid(&self) -> Option<u64> {
        self.last_txid
    }

    /// Sequence one entry and hand it to `sink`.
    ///
    /// Fresh entries are stamped; requeued stamped ones keep their id.
    /// Empty edits are stamped and their allocated write completed, but they
    /// are neither accounted nor appended.
    ///
    /// # Errors
    ///
    /// Returns the entry with the failure so the caller can roll the log
    /// and `requeue` it.
    pub fn process(
        &mut self,
        entry: PendingEntry,
        sink: &mut dyn EntrySink,
    ) -> Result<WalEntry<Stamped>, Rejected> {
        let stamped = match entry {
            PendingEntry::Stamped(stamped) => {
                self.metrics.increment_restamps_skipped();
                self.log_entry(Event::RestampSkipped, &stamped);
                stamped
            }
            PendingEntry::Unstamped(fresh) => {
                let txid = fresh.txid();
                if let Some(last_txid) = self.last_txid.filter(|_| self.config.enforce_txid_order) {
                    if txid <= last_txid {
                        let txid_field = txid.to_string();
                        let last_field = last_txid.to_string();
                        self.logger.event(
                            Event::OutOfOrder,
                            &[("last_txid", last_field.as_str()), ("txid", txid_field.as_str())],
                        );
                        return Err(Rejected {
                            entry: PendingEntry::Unstamped(fresh),
                            error: SequenceError::OutOfOrder { txid, last_txid },
                        });
                    }
                }
                let stamped = match fresh.stamp_region_sequence_id(self.mvcc.as_deref()) {
                    Ok(stamped) => stamped,
                    Err(err) => {
                        self.metrics.increment_allocation_failures();
                        let txid_field = txid.to_string();
                        let error_field = err.source.to_string();
                        self.logger.event(
                            Event::AllocationFailed,
                            &[("error", error_field.as_str()), ("txid", txid_field.as_str())],
                        );
                        return Err(err.into());
                    }
                };
                self.last_txid = Some(txid);
                self.record_stamp(&stamped);
                stamped
            }
        };

        if stamped.edit().is_empty() {
            // Nothing to append; publish the write so later ones can become visible.
            if let (Some(mvcc), Some(write_entry)) = (&self.mvcc, stamped.write_entry()) {
                mvcc.complete(write_entry);
            }
            return Ok(stamped);
        }

        if let Err(error) = sink.append(&stamped) {
            self.metrics.increment_sink_rejections();
            let txid_field = stamped.txid().to_string();
            let error_field = error.to_string();
            self.logger.event(
                Event::SinkRejected,
                &[("error", error_field.as_str()), ("txid", txid_field.as_str())],
            );
            return Err(Rejected {
                entry: PendingEntry::Stamped(stamped),
                error,
            });
        }

        self.accounting.update(
            stamped.key().encoded_region_name(),
            stamped.family_names(),
            stamped.sequence_id(),
            stamped.is_in_memstore(),
        );
        self.metrics.increment_appended();
        Ok(stamped)
    }

    /// Take the next entry off the transport, blocking until one arrives.
    ///
    /// Returns `None` once every producer is dropped and the queue is empty.
    /// Held-back entries come first.
    pub fn next_entry(&mut self) -> Option<PendingEntry> {
        if let Some(entry) = self.held_back.pop_front() {
            return Some(entry);
        }
        self.receiver.recv().ok()
    }

    /// Hold a rejected entry for retry ahead of everything on the channel.
    ///
    /// The entry keeps its txid, and its sequence id if it was already
    /// stamped. The next `next_entry` or `run` picks it up first.
    pub fn requeue(&mut self, entry: PendingEntry) {
        self.held_back.push_front(entry);
    }

    /// Number of entries held back for retry.
    pub fn held_back(&self) -> usize {
        self.held_back.len()
    }

    /// Drain the transport until every producer is gone.
    ///
    /// Returns the number of entries sequenced. Stops at the first failure
    /// and returns it; entries still queued stay queued. Pass the rejected
    /// entry to `requeue` before running again.
    pub fn run(&mut self, sink: &mut dyn EntrySink) -> Result<u64, Rejected> {
        let capacity = self.config.queue_capacity.to_string();
        self.logger
            .event(Event::SequencerStart, &[("queue_capacity", capacity.as_str())]);

        let mut processed = 0u64;
        while let Some(entry) = self.next_entry() {
            self.process(entry, sink)?;
            processed += 1;
        }

        let processed_field = processed.to_string();
        self.logger
            .event(Event::SequencerStop, &[("processed", processed_field.as_str())]);
        Ok(processed)
    }

    fn record_stamp(&self, stamped: &WalEntry<Stamped>) {
        self.metrics.increment_stamped();
        self.metrics.add_cells_stamped(stamped.cells_stamped() as u64);

        let event = match stamped.sequence_source() {
            SequenceSource::Allocated => {
                self.metrics.increment_allocated();
                Event::EntryStamped
            }
            SequenceSource::PreAssigned => {
                self.metrics.increment_pre_assigned();
                Event::PreAssignedUsed
            }
            SequenceSource::Unsequenced => Event::EntryUnsequenced,
        };
        self.log_entry(event, stamped);

        if stamped.edit().is_replay() {
            self.metrics.increment_replay();
            self.log_entry(Event::ReplayPreserved, stamped);
        }
    }

    fn log_entry(&self, event: Event, stamped: &WalEntry<Stamped>) {
        if !self.logger.is_enabled(event.severity()) {
            return;
        }
        let txid = stamped.txid().to_string();
        let sequence_id = stamped.sequence_id().to_string();
        let families = stamped.family_names().len().to_string();
        self.logger.event(
            event,
            &[
                ("families", families.as_str()),
                ("region", stamped.key().encoded_region_name()),
                ("sequence_id", sequence_id.as_str()),
                ("txid", txid.as_str()),
            ],
        );
    }
}

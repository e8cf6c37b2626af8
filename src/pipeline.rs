//! The event pipeline: raw messages in, ranked events out.
//!
//! Pure with respect to its inputs. No I/O, no clock: the evaluation time is
//! always passed in, so identical inputs give identical events.

use chrono::{DateTime, FixedOffset};
use tracing::{debug, warn};

use crate::config::ExtractionConfig;
use crate::diagnostic::{Diagnostic, DiagnosticSink, NullSink};
use crate::model::{DecodedMessage, Event};
use crate::nlp::rules::{RuleRecognizer, RuleResolver};
use crate::nlp::{DateResolver, TemporalEntityExtractor};
use crate::parser::decode_message_observed;
use crate::rank::dedup_and_rank;
use crate::urgency::classify;

/// Extraction and resolution engines wired together.
pub struct Pipeline {
    extractor: TemporalEntityExtractor,
    resolver: DateResolver,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::rule_based(&ExtractionConfig::default())
    }
}

impl Pipeline {
    pub fn new(extractor: TemporalEntityExtractor, resolver: DateResolver) -> Self {
        Self {
            extractor,
            resolver,
        }
    }

    /// Pipeline backed by the built-in regex recognizer and resolver.
    pub fn rule_based(config: &ExtractionConfig) -> Self {
        let extractor = TemporalEntityExtractor::new(Box::new(RuleRecognizer::new()))
            .with_context_radius(config.context_radius);
        let resolver =
            DateResolver::new(Box::new(RuleResolver::new())).with_prefer_future(config.prefer_future);
        Self::new(extractor, resolver)
    }

    /// Events of one decoded message, in mention order, not deduplicated.
    ///
    /// Mentions that do not resolve, or resolve to an instant that cannot be
    /// placed relative to `now`, are dropped.
    pub fn events_for_message(
        &self,
        message: &DecodedMessage,
        now: DateTime<FixedOffset>,
        sink: &mut dyn DiagnosticSink,
    ) -> Vec<Event> {
        let text = message.analysis_text();
        let mentions = self.extractor.extract(&text, sink);

        mentions
            .into_iter()
            .filter_map(|mention| {
                let instant = self.resolver.resolve(&mention, now, sink)?;
                let Some((days_until, urgency)) = classify(&instant, now) else {
                    warn!(text = %mention.entity_text, %instant, "resolved instant out of range");
                    sink.report(Diagnostic::ResolutionFailure {
                        text: mention.entity_text,
                    });
                    return None;
                };
                Some(Event {
                    original_text: mention.entity_text,
                    context_text: mention.context_window,
                    resolved_instant: instant,
                    days_until,
                    urgency,
                    entity_kind: mention.entity_kind,
                    source_subject: message.subject.clone(),
                    source_from: message.from.clone(),
                })
            })
            .collect()
    }

    /// Decode every raw message, collect their events, deduplicate and rank.
    pub fn produce_events<I, B>(&self, raw_messages: I, now: DateTime<FixedOffset>) -> Vec<Event>
    where
        I: IntoIterator<Item = B>,
        B: AsRef<[u8]>,
    {
        self.produce_events_observed(raw_messages, now, &mut NullSink)
    }

    /// [`Pipeline::produce_events`], reporting recovered failures to `sink`.
    pub fn produce_events_observed<I, B>(
        &self,
        raw_messages: I,
        now: DateTime<FixedOffset>,
        sink: &mut dyn DiagnosticSink,
    ) -> Vec<Event>
    where
        I: IntoIterator<Item = B>,
        B: AsRef<[u8]>,
    {
        let mut events = Vec::new();
        let mut messages = 0usize;
        for raw in raw_messages {
            let message = decode_message_observed(raw.as_ref(), sink);
            events.extend(self.events_for_message(&message, now, sink));
            messages += 1;
        }

        let found = events.len();
        let ranked = dedup_and_rank(events, *now.offset());
        debug!(messages, found, kept = ranked.len(), "produced events");
        ranked
    }
}

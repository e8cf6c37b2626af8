//! Mention-to-instant resolution on top of a [`TemporalResolver`].

use chrono::{DateTime, FixedOffset};

use crate::diagnostic::{Diagnostic, DiagnosticSink};
use crate::model::{CandidateMention, ResolvedInstant};

use super::{ResolveContext, TemporalResolver};

/// Resolves candidate mentions against an explicit evaluation time.
///
/// Past resolutions are returned like any other; `prefer_future` only
/// chooses between readings of directionless text such as a bare weekday.
pub struct DateResolver {
    resolver: Box<dyn TemporalResolver>,
    prefer_future: bool,
}

impl DateResolver {
    pub fn new(resolver: Box<dyn TemporalResolver>) -> Self {
        Self {
            resolver,
            prefer_future: true,
        }
    }

    pub fn with_prefer_future(mut self, prefer_future: bool) -> Self {
        self.prefer_future = prefer_future;
        self
    }

    /// Resolve one mention. Unresolvable text is reported to `sink`.
    pub fn resolve(
        &self,
        mention: &CandidateMention,
        now: DateTime<FixedOffset>,
        sink: &mut dyn DiagnosticSink,
    ) -> Option<ResolvedInstant> {
        let ctx = ResolveContext {
            now,
            prefer_future: self.prefer_future,
        };
        let resolved = self.resolver.resolve(&mention.entity_text, &ctx);
        if resolved.is_none() {
            sink.report(Diagnostic::ResolutionFailure {
                text: mention.entity_text.clone(),
            });
        }
        resolved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EntityKind;
    use chrono::{Duration, TimeZone};

    /// Resolves "past" to one day before now and nothing else.
    struct OnlyPast;

    impl TemporalResolver for OnlyPast {
        fn resolve(&self, text: &str, ctx: &ResolveContext) -> Option<ResolvedInstant> {
            (text == "past").then(|| ResolvedInstant::Zoned(ctx.now - Duration::days(1)))
        }
    }

    fn mention(text: &str) -> CandidateMention {
        CandidateMention {
            entity_text: text.into(),
            entity_kind: EntityKind::Date,
            context_window: text.into(),
            source_span: 0..text.len(),
        }
    }

    #[test]
    fn test_past_resolution_is_kept() {
        let now = FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2026, 10, 19, 9, 0, 0)
            .unwrap();
        let resolver = DateResolver::new(Box::new(OnlyPast));
        let got = resolver.resolve(&mention("past"), now, &mut Vec::new());
        assert_eq!(got, Some(ResolvedInstant::Zoned(now - Duration::days(1))));
    }

    #[test]
    fn test_failure_reported() {
        let now = FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2026, 10, 19, 9, 0, 0)
            .unwrap();
        let resolver = DateResolver::new(Box::new(OnlyPast));
        let mut sink: Vec<Diagnostic> = Vec::new();
        assert!(resolver.resolve(&mention("someday"), now, &mut sink).is_none());
        assert_eq!(
            sink,
            vec![Diagnostic::ResolutionFailure {
                text: "someday".into()
            }]
        );
    }
}

use itertools::Itertools;

/// The relationship include list requested for a resource type, plus the
/// ordered fallback ladder tried when the server rejects the requested
/// includes. The ladder always ends with the empty include list, so the
/// retry loop in the fetcher terminates in the worst case.
#[derive(Debug, Clone, PartialEq)]
pub struct IncludeSpec {
    full: Vec<String>,
    ladder: Vec<Vec<String>>,
}

impl IncludeSpec {
    /// No relationships requested at all.
    pub fn none() -> Self {
        Self {
            full: Vec::new(),
            ladder: vec![Vec::new()],
        }
    }

    /// Spec with the default fallback ladder: each relationship alone, in
    /// declaration order, then no includes at all.
    pub fn new<'a>(full: impl IntoIterator<Item = &'a str>) -> Self {
        let full: Vec<String> = full.into_iter().map(str::to_string).collect();
        let mut ladder: Vec<Vec<String>> = full.iter().map(|name| vec![name.clone()]).collect();
        ladder.push(Vec::new());
        Self { full, ladder }
    }

    /// Spec with an explicit fallback ladder. A trailing empty rung is
    /// appended when the caller leaves it out.
    pub fn with_ladder<'a>(
        full: impl IntoIterator<Item = &'a str>,
        ladder: impl IntoIterator<Item = Vec<&'a str>>,
    ) -> Self {
        let full: Vec<String> = full.into_iter().map(str::to_string).collect();
        let mut ladder: Vec<Vec<String>> = ladder
            .into_iter()
            .map(|rung| rung.into_iter().map(str::to_string).collect())
            .collect();
        if ladder.last().map(|rung| !rung.is_empty()).unwrap_or(true) {
            ladder.push(Vec::new());
        }
        Self { full, ladder }
    }

    /// The declared relationship names, used for coverage reporting.
    pub fn names(&self) -> &[String] {
        &self.full
    }

    /// The joined `include` parameter for the full list; None when no
    /// relationships are requested.
    pub fn full_param(&self) -> Option<String> {
        Self::join(&self.full)
    }

    /// Walk the ladder starting at `cursor`, skipping rungs whose joined
    /// form equals the current include parameter. Returns the next
    /// candidate parameter and the cursor position just past it. The
    /// cursor only moves forward, so repeated rejections step down the
    /// ladder instead of cycling.
    pub fn next_fallback(&self, cursor: usize, current: Option<&str>) -> Option<(Option<String>, usize)> {
        for (offset, rung) in self.ladder.iter().enumerate().skip(cursor) {
            let candidate = Self::join(rung);
            if candidate.as_deref() != current {
                return Some((candidate, offset + 1));
            }
        }
        None
    }

    fn join(names: &[String]) -> Option<String> {
        if names.is_empty() {
            None
        } else {
            Some(names.iter().join(","))
        }
    }
}

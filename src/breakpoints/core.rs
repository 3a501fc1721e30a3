/// Threshold of the synthetic base entry. Sorts below every real threshold
/// and is treated as always satisfied.
pub const BASE_THRESHOLD: i64 = -1;

/// One configuration that becomes active once the measurement reaches
/// `threshold`.
#[derive(Debug, Clone, PartialEq)]
pub struct Breakpoint<C> {
    pub threshold: i64,
    pub config: C,
}

/// Entries sorted ascending by threshold, base entry first.
#[derive(Debug, Clone, PartialEq)]
pub struct BreakpointTable<C> {
    entries: Vec<Breakpoint<C>>,
}

impl<C> BreakpointTable<C> {
    /// Build a table from `base` plus `(threshold, config)` pairs in any
    /// order. Equal thresholds keep their input order.
    pub fn new(base: C, entries: impl IntoIterator<Item = (i64, C)>) -> Self {
        let mut entries: Vec<Breakpoint<C>> = std::iter::once(Breakpoint {
            threshold: BASE_THRESHOLD,
            config: base,
        })
        .chain(
            entries
                .into_iter()
                .map(|(threshold, config)| Breakpoint { threshold, config }),
        )
        .collect();
        entries.sort_by_key(|entry| entry.threshold);
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Never true: the base entry is always present.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Breakpoint<C>> {
        self.entries.get(index)
    }

    pub fn thresholds(&self) -> impl Iterator<Item = i64> + '_ {
        self.entries.iter().map(|entry| entry.threshold)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Breakpoint<C>> {
        self.entries.iter()
    }

    pub fn initial_index(&self, measurement: i64) -> usize {
        initial_index(measurement, self)
    }

    pub fn reselect(&self, measurement: i64, current: usize) -> usize {
        reselect(measurement, self, current)
    }
}

/// Index of the last entry whose threshold does not exceed `measurement`,
/// scanning from the lowest threshold. The base entry matches even when the
/// measurement is below it.
pub fn initial_index<C>(measurement: i64, table: &BreakpointTable<C>) -> usize {
    let mut index = 0;
    for (i, entry) in table.entries.iter().enumerate() {
        if measurement < entry.threshold {
            break;
        }
        index = i;
    }
    index
}

/// Re-evaluate starting from the current index instead of rescanning the
/// table: forward when the measurement grew past the current threshold,
/// backward when it dropped below it. The scan crosses as many entries as
/// needed, so large jumps still land on the right index.
pub fn reselect<C>(measurement: i64, table: &BreakpointTable<C>, current: usize) -> usize {
    let entries = &table.entries;
    let Some(last) = entries.len().checked_sub(1) else {
        return 0;
    };
    let current = current.min(last);
    let threshold = entries[current].threshold;

    if measurement > threshold {
        let mut index = current;
        for (i, entry) in entries.iter().enumerate().skip(current + 1) {
            if measurement < entry.threshold {
                break;
            }
            index = i;
        }
        index
    } else if measurement < threshold {
        (0..current)
            .rev()
            .find(|&i| measurement >= entries[i].threshold)
            .unwrap_or(0)
    } else {
        current
    }
}

/// A table plus the index that is currently active.
#[derive(Debug, Clone, PartialEq)]
pub struct BreakpointSelector<C> {
    table: BreakpointTable<C>,
    current: usize,
}

impl<C> BreakpointSelector<C> {
    pub fn new(table: BreakpointTable<C>, measurement: i64) -> Self {
        let current = table.initial_index(measurement);
        Self { table, current }
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn active(&self) -> &Breakpoint<C> {
        &self.table.entries[self.current]
    }

    pub fn table(&self) -> &BreakpointTable<C> {
        &self.table
    }

    /// Feed a new measurement. Returns the new index only when it changed;
    /// the caller is then expected to run a full relayout.
    pub fn select(&mut self, measurement: i64) -> Option<usize> {
        let next = self.table.reselect(measurement, self.current);
        if next == self.current {
            return None;
        }
        self.current = next;
        Some(next)
    }
}

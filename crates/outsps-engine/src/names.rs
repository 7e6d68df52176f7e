//! Unique resource names for items created during a run.
//!
//! Names are a pure function of an explicit counter; there is no global
//! state.

/// `"{prefix}_{run_seed}_{counter}"`.
pub fn resource_name(prefix: &str, run_seed: &str, counter: u64) -> String {
    format!("{}_{}_{}", prefix, run_seed, counter)
}

/// Successive [`resource_name`]s for one prefix, counting from 1.
#[derive(Debug, Clone)]
pub struct NameSequence {
    prefix: String,
    run_seed: String,
    counter: u64,
}

impl NameSequence {
    pub fn new(prefix: impl Into<String>, run_seed: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            run_seed: run_seed.into(),
            counter: 0,
        }
    }

    /// Number of names handed out so far.
    pub fn counter(&self) -> u64 {
        self.counter
    }
}

impl Iterator for NameSequence {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        self.counter = self.counter.checked_add(1)?;
        Some(resource_name(&self.prefix, &self.run_seed, self.counter))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_counts_from_one() {
        let mut names = NameSequence::new("Appointment", "0419");
        assert_eq!(names.next().as_deref(), Some("Appointment_0419_1"));
        assert_eq!(names.next().as_deref(), Some("Appointment_0419_2"));
        assert_eq!(names.counter(), 2);
    }

    #[test]
    fn independent_sequences_do_not_interfere() {
        let a: Vec<String> = NameSequence::new("List", "s").take(2).collect();
        let b: Vec<String> = NameSequence::new("List", "s").take(2).collect();
        assert_eq!(a, b);
        assert_eq!(resource_name("List", "s", 3), "List_s_3");
    }
}

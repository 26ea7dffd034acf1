//! Strongly-typed identifiers for group membership.
//!
//! Explicit types prevent bugs from mixing up a group id with a member id,
//! or a member epoch with a partition index.

use std::collections::BTreeSet;
use std::fmt;

/// Macro to generate string-backed name wrappers.
///
/// Each name type wraps a `String` and provides:
/// - Type safety (can't pass a `MemberId` where a `GroupId` is expected)
/// - Debug/Display formatting
/// - Borrowing as `&str`
macro_rules! define_name {
    ($name:ident, $prefix:expr, $doc:expr) => {
        #[doc = $doc]
        #[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
        pub struct $name(String);

        impl $name {
            /// Creates a new name from anything convertible to a `String`.
            #[must_use]
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Returns the name as a string slice.
            #[inline]
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Returns true if the name is empty.
            #[inline]
            #[must_use]
            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({:?})", $prefix, self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self::new(value)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_name!(GroupId, "group", "Identifier of a consumer group.");
define_name!(
    MemberId,
    "member",
    "Opaque member token assigned by the group coordinator. Empty until the first successful heartbeat."
);

/// Member epoch.
///
/// Scoped to one membership instance: it never decreases while the member id
/// is unchanged and resets to `JOIN` together with the member id on fencing.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct MemberEpoch(i32);

impl MemberEpoch {
    /// Epoch carried by a heartbeat that (re)joins the group.
    pub const JOIN: Self = Self(0);

    /// Sentinel epoch carried by the leave-group heartbeat.
    pub const LEAVE: Self = Self(-1);

    /// Creates an epoch from a raw value.
    #[inline]
    #[must_use]
    pub const fn new(value: i32) -> Self {
        Self(value)
    }

    /// Returns the raw value.
    #[inline]
    #[must_use]
    pub const fn get(self) -> i32 {
        self.0
    }

    /// Returns true for the leave sentinel.
    #[inline]
    #[must_use]
    pub const fn is_leave(self) -> bool {
        self.0 == Self::LEAVE.0
    }

    /// Returns true for the join epoch.
    #[inline]
    #[must_use]
    pub const fn is_join(self) -> bool {
        self.0 == Self::JOIN.0
    }
}

impl fmt::Debug for MemberEpoch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "epoch({})", self.0)
    }
}

impl fmt::Display for MemberEpoch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i32> for MemberEpoch {
    fn from(value: i32) -> Self {
        Self::new(value)
    }
}

impl From<MemberEpoch> for i32 {
    fn from(epoch: MemberEpoch) -> Self {
        epoch.get()
    }
}

/// A single partition of a topic.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TopicPartition {
    /// Topic name.
    pub topic: String,
    /// Partition index within the topic.
    pub partition: i32,
}

impl TopicPartition {
    /// Creates a new topic-partition.
    #[must_use]
    pub fn new(topic: impl Into<String>, partition: i32) -> Self {
        Self {
            topic: topic.into(),
            partition,
        }
    }
}

impl fmt::Display for TopicPartition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.topic, self.partition)
    }
}

/// An ordered set of topic-partitions.
///
/// Ordering is deterministic so that events, requests and logs are stable
/// across runs.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PartitionSet(BTreeSet<TopicPartition>);

impl PartitionSet {
    /// Creates an empty set.
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeSet::new())
    }

    /// Inserts a partition, returning true if it was not present.
    pub fn insert(&mut self, tp: TopicPartition) -> bool {
        self.0.insert(tp)
    }

    /// Removes a partition, returning true if it was present.
    pub fn remove(&mut self, tp: &TopicPartition) -> bool {
        self.0.remove(tp)
    }

    /// Returns true if the partition is in the set.
    #[must_use]
    pub fn contains(&self, tp: &TopicPartition) -> bool {
        self.0.contains(tp)
    }

    /// Returns the number of partitions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the set holds no partitions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates partitions in order.
    pub fn iter(&self) -> impl Iterator<Item = &TopicPartition> {
        self.0.iter()
    }

    /// Returns the partitions in `self` that are not in `other`.
    #[must_use]
    pub fn difference(&self, other: &Self) -> Self {
        Self(self.0.difference(&other.0).cloned().collect())
    }

    /// Returns the partitions in either set.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self(self.0.union(&other.0).cloned().collect())
    }

    /// Returns true if every partition of `self` is in `other`.
    #[must_use]
    pub fn is_subset(&self, other: &Self) -> bool {
        self.0.is_subset(&other.0)
    }

    /// Returns true if the sets share no partition.
    #[must_use]
    pub fn is_disjoint(&self, other: &Self) -> bool {
        self.0.is_disjoint(&other.0)
    }

    /// Removes every partition in `other` from `self`.
    pub fn subtract(&mut self, other: &Self) {
        self.0.retain(|tp| !other.0.contains(tp));
    }

    /// Adds every partition in `other` to `self`.
    pub fn extend_from(&mut self, other: &Self) {
        self.0.extend(other.0.iter().cloned());
    }

    /// Groups partitions by topic, partitions sorted ascending.
    #[must_use]
    pub fn by_topic(&self) -> Vec<(&str, Vec<i32>)> {
        let mut grouped: Vec<(&str, Vec<i32>)> = Vec::new();
        for tp in &self.0 {
            match grouped.last_mut() {
                Some((topic, partitions)) if *topic == tp.topic => partitions.push(tp.partition),
                _ => grouped.push((tp.topic.as_str(), vec![tp.partition])),
            }
        }
        grouped
    }
}

impl FromIterator<TopicPartition> for PartitionSet {
    fn from_iter<I: IntoIterator<Item = TopicPartition>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for PartitionSet {
    type Item = TopicPartition;
    type IntoIter = std::collections::btree_set::IntoIter<TopicPartition>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a PartitionSet {
    type Item = &'a TopicPartition;
    type IntoIter = std::collections::btree_set::Iter<'a, TopicPartition>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for PartitionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("[]");
        }
        for (i, (topic, partitions)) in self.by_topic().into_iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{topic}[")?;
            for (j, partition) in partitions.iter().enumerate() {
                if j > 0 {
                    f.write_str(",")?;
                }
                write!(f, "{partition}")?;
            }
            f.write_str("]")?;
        }
        Ok(())
    }
}

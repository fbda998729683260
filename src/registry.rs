//! Identity-keyed registry of exported objects, one record per identity,
//! one snapshot slot per motion sample.
//!
//! The registry lives for a single frame export: the scene walker inserts
//! every object at every time sample during one traversal pass, the motion
//! planner reads the filled slots back, and the whole table is dropped when
//! the frame is done. There is no per-record deletion.

use crate::{
    error::{RibwireError, RibwireResult},
    snapshot::{ObjectKind, Snapshot},
};

const BUCKET_COUNT: usize = 256;

/// Identity of one exported object: its scene path plus an optional
/// instance discriminator for duplicated/instanced geometry.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ObjectIdentity {
    pub path: String,
    pub instance: Option<String>,
}

impl ObjectIdentity {
    pub fn path(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            instance: None,
        }
    }

    pub fn instance(path: impl Into<String>, discriminator: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            instance: Some(discriminator.into()),
        }
    }
}

impl std::fmt::Display for ObjectIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.instance {
            Some(d) => write!(f, "{}#{}", self.path, d),
            None => write!(f, "{}", self.path),
        }
    }
}

/// One registered object: its identity, kind, and up to `motion_samples`
/// snapshot slots filled during the traversal pass.
#[derive(Clone, Debug)]
pub struct ObjectRecord {
    identity: ObjectIdentity,
    kind: ObjectKind,
    samples: Vec<Option<Snapshot>>,
}

impl ObjectRecord {
    pub fn identity(&self) -> &ObjectIdentity {
        &self.identity
    }

    pub fn kind(&self) -> ObjectKind {
        self.kind
    }

    /// Snapshot slots in sample order; unfilled slots are `None`.
    pub fn samples(&self) -> &[Option<Snapshot>] {
        &self.samples
    }

    pub fn sample(&self, index: usize) -> Option<&Snapshot> {
        self.samples.get(index).and_then(|s| s.as_ref())
    }

    /// Filled snapshots in sample order, gaps skipped.
    pub fn filled_samples(&self) -> impl Iterator<Item = &Snapshot> {
        self.samples.iter().filter_map(|s| s.as_ref())
    }
}

/// Opaque position of a record inside the registry. Valid until the
/// registry is dropped; records are never removed or reordered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RecordHandle {
    bucket: usize,
    index: usize,
}

/// Hash-bucketed registry with per-bucket chains.
///
/// The hash covers the identity path only, so all instance records of one
/// underlying object land in the same bucket chain and can be enumerated
/// together via [`ObjectRegistry::chain_for_path`].
pub struct ObjectRegistry {
    buckets: Vec<Vec<ObjectRecord>>,
    motion_samples: usize,
    len: usize,
}

impl ObjectRegistry {
    /// `motion_samples` is the configured number of motion/deformation
    /// samples per object, at least 1.
    pub fn new(motion_samples: usize) -> RibwireResult<Self> {
        if motion_samples == 0 {
            return Err(RibwireError::validation("motion_samples must be >= 1"));
        }
        Ok(Self {
            buckets: (0..BUCKET_COUNT).map(|_| Vec::new()).collect(),
            motion_samples,
            len: 0,
        })
    }

    pub fn motion_samples(&self) -> usize {
        self.motion_samples
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Registers `snapshot` for `identity` at `sample_index`.
    ///
    /// First insert for an identity allocates a fresh record in its path's
    /// bucket chain; later inserts fill further sample slots in place. A
    /// populated slot is never overwritten: the duplicate is dropped with a
    /// warning and the existing record's handle is returned.
    pub fn insert(
        &mut self,
        identity: ObjectIdentity,
        sample_index: usize,
        snapshot: Snapshot,
    ) -> RibwireResult<RecordHandle> {
        if sample_index >= self.motion_samples {
            return Err(RibwireError::validation(format!(
                "sample index {sample_index} out of range (motion samples: {})",
                self.motion_samples
            )));
        }

        let bucket = bucket_for(&identity.path);
        if let Some(index) = self.buckets[bucket]
            .iter()
            .position(|r| r.identity == identity)
        {
            let record = &mut self.buckets[bucket][index];
            if record.kind != snapshot.kind() {
                return Err(RibwireError::validation(format!(
                    "object '{identity}' registered as {} but sample {sample_index} is {}",
                    record.kind.kind_name(),
                    snapshot.kind().kind_name()
                )));
            }
            let slot = &mut record.samples[sample_index];
            if slot.is_some() {
                tracing::warn!(
                    object = %identity,
                    sample_index,
                    "duplicate sample write ignored"
                );
            } else {
                *slot = Some(snapshot);
            }
            return Ok(RecordHandle { bucket, index });
        }

        let mut samples: Vec<Option<Snapshot>> =
            (0..self.motion_samples).map(|_| None).collect();
        let kind = snapshot.kind();
        samples[sample_index] = Some(snapshot);
        self.buckets[bucket].push(ObjectRecord {
            identity,
            kind,
            samples,
        });
        self.len += 1;
        Ok(RecordHandle {
            bucket,
            index: self.buckets[bucket].len() - 1,
        })
    }

    /// Exact-identity lookup: hash the path, then scan the bucket chain.
    pub fn find(&self, identity: &ObjectIdentity) -> Option<RecordHandle> {
        let bucket = bucket_for(&identity.path);
        self.buckets[bucket]
            .iter()
            .position(|r| &r.identity == identity)
            .map(|index| RecordHandle { bucket, index })
    }

    pub fn record(&self, handle: RecordHandle) -> Option<&ObjectRecord> {
        self.buckets.get(handle.bucket)?.get(handle.index)
    }

    pub fn record_mut(&mut self, handle: RecordHandle) -> Option<&mut ObjectRecord> {
        self.buckets.get_mut(handle.bucket)?.get_mut(handle.index)
    }

    /// All records sharing `path`, instance records included, in insertion
    /// order within the bucket chain.
    pub fn chain_for_path<'a>(
        &'a self,
        path: &'a str,
    ) -> impl Iterator<Item = &'a ObjectRecord> {
        self.buckets[bucket_for(path)]
            .iter()
            .filter(move |r| r.identity.path == path)
    }

    /// Every record in the registry, bucket by bucket.
    pub fn records(&self) -> impl Iterator<Item = (RecordHandle, &ObjectRecord)> {
        self.buckets.iter().enumerate().flat_map(|(bucket, chain)| {
            chain
                .iter()
                .enumerate()
                .map(move |(index, record)| (RecordHandle { bucket, index }, record))
        })
    }
}

fn bucket_for(path: &str) -> usize {
    (fnv1a64(path.as_bytes()) % BUCKET_COUNT as u64) as usize
}

// FNV-1a 64. Replaces the original exporter's additive character sum;
// nothing depends on bucket iteration order.
fn fnv1a64(bytes: &[u8]) -> u64 {
    let mut h = 0xcbf29ce484222325u64;
    for &b in bytes {
        h ^= b as u64;
        h = h.wrapping_mul(0x100000001b3);
    }
    h
}

//! Fingerprint computation for files and modules

use crate::types::Fingerprint;

/// Fingerprint of a file's bytes
pub fn file_fingerprint(content: &[u8]) -> Fingerprint {
    Fingerprint(*blake3::hash(content).as_bytes())
}

/// Fingerprint of a module from the `(relative path, fingerprint)` pairs of
/// the files it owns directly and of its child modules.
///
/// The two groups are tagged apart, so moving a file between a module and a
/// child changes the result. Each group is sorted first so the result does
/// not depend on discovery order.
pub fn module_fingerprint<'a, F, M>(files: F, modules: M) -> Fingerprint
where
    F: IntoIterator<Item = (&'a str, Fingerprint)>,
    M: IntoIterator<Item = (&'a str, Fingerprint)>,
{
    let mut hasher = blake3::Hasher::new();
    hash_group(&mut hasher, b'F', files);
    hash_group(&mut hasher, b'M', modules);
    Fingerprint(*hasher.finalize().as_bytes())
}

fn hash_group<'a, I>(hasher: &mut blake3::Hasher, tag: u8, entries: I)
where
    I: IntoIterator<Item = (&'a str, Fingerprint)>,
{
    let mut entries: Vec<(&str, Fingerprint)> = entries.into_iter().collect();
    entries.sort();

    hasher.update(&[tag]);
    hasher.update(&(entries.len() as u64).to_le_bytes());
    for (path, fingerprint) in entries {
        hasher.update(&(path.len() as u64).to_le_bytes());
        hasher.update(path.as_bytes());
        hasher.update(&fingerprint.0);
    }
}

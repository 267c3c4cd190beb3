use lazy_static::lazy_static;
use std::sync::RwLock;
pub use string_cache::DefaultAtom as Atom;

lazy_static! {
    static ref PROFILE_INTERNER: RwLock<Vec<Atom>> = RwLock::new(Vec::new());
}

/// Intern a display profile name and return its id
pub fn intern_profile(name: &str) -> usize {
    let atom = Atom::from(name);
    let mut v = PROFILE_INTERNER
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    match v.iter().position(|a| *a == atom) {
        Some(idx) => idx,
        None => {
            v.push(atom);
            v.len() - 1
        }
    }
}

pub fn profile_name(id: usize) -> Option<String> {
    PROFILE_INTERNER
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .get(id)
        .map(|a| a.to_string())
}

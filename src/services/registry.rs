use crate::chord::Chord;
use crate::debug_if_enabled;
use crate::events::KeybindId;
use parking_lot::Mutex;
use smallvec::SmallVec;
use std::collections::HashMap;
use std::sync::Arc;

/// Набор идентификаторов, привязанных к одному сочетанию (в порядке регистрации)
pub type KeybindIds = SmallVec<[KeybindId; 4]>;

#[derive(Debug, Default)]
struct RegistryInner {
    by_id: HashMap<KeybindId, Chord>,
    by_chord: HashMap<Chord, KeybindIds>,
}

impl RegistryInner {
    fn detach(&mut self, id: KeybindId, chord: &Chord) {
        if let Some(ids) = self.by_chord.get_mut(chord) {
            ids.retain(|x| *x != id);
            if ids.is_empty() {
                self.by_chord.remove(chord);
            }
        }
    }
}

/// Потокобезопасная таблица keybind'ов: прямое отображение id → сочетание и
/// обратный индекс сочетание → id.
///
/// Оба отображения меняются под одной блокировкой, поэтому `lookup` никогда не
/// видит частично применённую регистрацию. Клоны разделяют одну таблицу.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    inner: Arc<Mutex<RegistryInner>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Привязать `id` к сочетанию, заменив предыдущую привязку этого id.
    /// Возвращает прежнее сочетание, если оно было.
    pub fn register(&self, id: KeybindId, chord: Chord) -> Option<Chord> {
        let mut inner = self.inner.lock();
        let previous = inner.by_id.insert(id, chord);
        if let Some(old) = previous {
            inner.detach(id, &old);
        }
        let ids = inner.by_chord.entry(chord).or_default();
        if !ids.contains(&id) {
            ids.push(id);
        }
        drop(inner);

        debug_if_enabled!("Keybind {} зарегистрирован: {} (было: {:?})", id, chord, previous);
        previous
    }

    /// Удалить привязку `id`; для неизвестного id ничего не делает
    pub fn unregister(&self, id: KeybindId) -> Option<Chord> {
        let mut inner = self.inner.lock();
        let removed = inner.by_id.remove(&id);
        if let Some(chord) = removed {
            inner.detach(id, &chord);
        }
        drop(inner);

        debug_if_enabled!("Keybind {} снят с регистрации (сочетание: {:?})", id, removed);
        removed
    }

    /// Все id, привязанные ровно к этому сочетанию
    pub fn lookup(&self, chord: &Chord) -> KeybindIds {
        self.inner
            .lock()
            .by_chord
            .get(chord)
            .cloned()
            .unwrap_or_default()
    }

    pub fn chord_of(&self, id: KeybindId) -> Option<Chord> {
        self.inner.lock().by_id.get(&id).copied()
    }

    /// Привязан ли `id` к этому сочетанию прямо сейчас
    pub fn is_bound(&self, id: KeybindId, chord: &Chord) -> bool {
        self.inner.lock().by_id.get(&id) == Some(chord)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Снимок всех привязок, отсортированный по id
    pub fn snapshot(&self) -> Vec<(KeybindId, Chord)> {
        let mut entries: Vec<(KeybindId, Chord)> = self
            .inner
            .lock()
            .by_id
            .iter()
            .map(|(id, chord)| (*id, *chord))
            .collect();
        entries.sort_by_key(|(id, _)| *id);
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn chord(spec: &str) -> Chord {
        Chord::parse(spec).unwrap()
    }

    #[test]
    fn test_register_replaces_previous_chord() {
        let registry = Registry::new();
        let a = chord("ctrl+a");
        let b = chord("ctrl+b");

        assert_eq!(registry.register(1, a), None);
        assert_eq!(registry.register(1, b), Some(a));

        assert!(!registry.lookup(&a).contains(&1));
        assert!(registry.lookup(&b).contains(&1));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.chord_of(1), Some(b));
    }

    #[test]
    fn test_register_same_chord_twice_is_idempotent() {
        let registry = Registry::new();
        let a = chord("alt+f4");
        registry.register(5, a);
        registry.register(5, a);
        assert_eq!(registry.lookup(&a).as_slice(), &[5]);
    }

    #[test]
    fn test_unregister_unknown_is_noop() {
        let registry = Registry::new();
        assert_eq!(registry.unregister(999), None);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_multiple_ids_same_chord() {
        let registry = Registry::new();
        let x = chord("ctrl+shift+x");
        registry.register(1, x);
        registry.register(2, x);
        assert_eq!(registry.lookup(&x).as_slice(), &[1, 2]);

        registry.unregister(1);
        assert_eq!(registry.lookup(&x).as_slice(), &[2]);
        assert!(registry.is_bound(2, &x));
        assert!(!registry.is_bound(1, &x));
    }

    #[test]
    fn test_lookup_is_exact_on_modifiers() {
        let registry = Registry::new();
        registry.register(1, chord("ctrl+k"));
        assert!(registry.lookup(&chord("ctrl+shift+k")).is_empty());
        assert!(registry.lookup(&chord("k")).is_empty());
    }

    #[test]
    fn test_snapshot_sorted_by_id() {
        let registry = Registry::new();
        registry.register(3, chord("c"));
        registry.register(1, chord("a"));
        registry.register(2, chord("b"));
        let ids: Vec<KeybindId> = registry.snapshot().into_iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_concurrent_mutation_keeps_indexes_consistent() {
        let registry = Registry::new();
        let chords = [chord("ctrl+a"), chord("ctrl+b"), chord("ctrl+c")];

        let handles: Vec<_> = (0..4u32)
            .map(|t| {
                let registry = registry.clone();
                thread::spawn(move || {
                    for i in 0..500u32 {
                        let id = (t * 1000 + i) % 16;
                        if i % 3 == 0 {
                            registry.unregister(id);
                        } else {
                            registry.register(id, chords[(i as usize) % chords.len()]);
                        }
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        for (id, bound) in registry.snapshot() {
            assert!(registry.lookup(&bound).contains(&id));
            for other in chords.iter().filter(|c| **c != bound) {
                assert!(!registry.lookup(other).contains(&id));
            }
        }
    }
}

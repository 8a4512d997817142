use crate::chord::Chord;
use crate::debug_if_enabled;
use crate::error::Result;
use crate::events::{KeyCode, KeyState, KeybindTrigger, RawKeyEvent};
use crate::services::dispatcher::DispatchSender;
use crate::services::event_source::EventStream;
use crate::services::modifier_state::ModifierState;
use crate::services::registry::{KeybindIds, Registry};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::HashMap;
use tracing::{error, info};

/// Поведение при автоповторе (клавиша удерживается)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepeatPolicy {
    /// Одно срабатывание на физическое нажатие
    #[default]
    Once,
    /// Срабатывание на каждый автоповтор
    EveryRepeat,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatcherOptions {
    pub repeat_policy: RepeatPolicy,
    pub report_releases: bool,
}

pub type Triggers = SmallVec<[KeybindTrigger; 4]>;

/// Нажатая основная клавиша и id, сработавшие на её нажатие
#[derive(Debug)]
struct ActivePress {
    chord: Chord,
    fired: KeybindIds,
}

/// Цикл сопоставления событий с таблицей keybind'ов.
///
/// Единственное собственное состояние: зажатые модификаторы и нажатые основные клавиши.
pub struct Matcher {
    registry: Registry,
    options: MatcherOptions,
    modifier_state: ModifierState,
    active: HashMap<KeyCode, ActivePress>,
}

impl Matcher {
    pub fn new(registry: Registry, options: MatcherOptions) -> Self {
        Self {
            registry,
            options,
            modifier_state: ModifierState::new(),
            active: HashMap::new(),
        }
    }

    /// Обработать одно событие и вернуть срабатывания в порядке доставки
    pub fn handle_event(&mut self, event: &RawKeyEvent) -> Triggers {
        if self.modifier_state.update_key(event.key_code, event.state) {
            return Triggers::new();
        }

        let held = self.modifier_state.to_modifiers().union(&event.modifiers);
        let Some(candidate) = Chord::new(held, event.key_code) else {
            return Triggers::new();
        };

        match event.state {
            KeyState::Pressed if !self.active.contains_key(&event.key_code) => self.press(candidate),
            // Повторный Pressed без Released платформа присылает вместо автоповтора
            KeyState::Pressed | KeyState::Repeat => self.repeat(candidate),
            KeyState::Released => self.release(event.key_code),
        }
    }

    fn press(&mut self, candidate: Chord) -> Triggers {
        let ids = self.registry.lookup(&candidate);
        debug_if_enabled!("Нажатие {} -> {:?}", candidate, ids);

        let triggers = ids.iter().map(|id| KeybindTrigger::Pressed(*id)).collect();
        self.active.insert(
            candidate.key(),
            ActivePress {
                chord: candidate,
                fired: ids,
            },
        );
        triggers
    }

    fn repeat(&mut self, candidate: Chord) -> Triggers {
        match self.options.repeat_policy {
            RepeatPolicy::Once => {
                // Клавиша могла быть нажата до начала захвата
                self.active.entry(candidate.key()).or_insert_with(|| ActivePress {
                    chord: candidate,
                    fired: KeybindIds::new(),
                });
                Triggers::new()
            }
            RepeatPolicy::EveryRepeat => {
                let ids = self.registry.lookup(&candidate);
                let triggers = ids.iter().map(|id| KeybindTrigger::Pressed(*id)).collect();
                let entry = self.active.entry(candidate.key()).or_insert_with(|| ActivePress {
                    chord: candidate,
                    fired: KeybindIds::new(),
                });
                for id in ids {
                    if !entry.fired.contains(&id) {
                        entry.fired.push(id);
                    }
                }
                triggers
            }
        }
    }

    fn release(&mut self, key: KeyCode) -> Triggers {
        let Some(press) = self.active.remove(&key) else {
            return Triggers::new();
        };
        if !self.options.report_releases {
            return Triggers::new();
        }
        press
            .fired
            .iter()
            .filter(|id| self.registry.is_bound(**id, &press.chord))
            .map(|id| KeybindTrigger::Released(*id))
            .collect()
    }

    /// Основной цикл: читает поток до закрытия, `Err` - фатальная ошибка источника
    pub async fn run(mut self, mut stream: EventStream, dispatch: DispatchSender) -> Result<()> {
        info!(
            "Цикл сопоставления запущен (повтор: {:?}, отпускания: {})",
            self.options.repeat_policy, self.options.report_releases
        );

        let mut processed: u64 = 0;
        while let Some(item) = stream.next().await {
            match item {
                Ok(event) => {
                    processed += 1;
                    for trigger in self.handle_event(&event) {
                        debug_if_enabled!("Срабатывание {:?} по событию {}", trigger, event);
                        dispatch.trigger(trigger);
                    }
                }
                Err(e) => {
                    error!("Фатальная ошибка источника событий: {}", e);
                    return Err(e);
                }
            }
        }

        info!("Поток событий закрыт, обработано событий: {}", processed);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{KeybindId, Modifiers};

    fn setup(bindings: &[(KeybindId, &str)], options: MatcherOptions) -> (Registry, Matcher) {
        let registry = Registry::new();
        for (id, spec) in bindings {
            registry.register(*id, Chord::parse(spec).unwrap());
        }
        let matcher = Matcher::new(registry.clone(), options);
        (registry, matcher)
    }

    fn event(key: KeyCode, state: KeyState) -> RawKeyEvent {
        RawKeyEvent::new(key, state, Modifiers::new(), "test")
    }

    fn feed(matcher: &mut Matcher, events: &[(KeyCode, KeyState)]) -> Vec<KeybindTrigger> {
        events
            .iter()
            .flat_map(|(key, state)| matcher.handle_event(&event(*key, *state)))
            .collect()
    }

    use crate::events::KeyState::{Pressed, Released, Repeat};

    #[test]
    fn test_exact_modifier_match_only() {
        let (_, mut matcher) = setup(&[(1, "ctrl+k")], MatcherOptions::default());
        let fired = feed(
            &mut matcher,
            &[(KeyCode::LeftControl, Pressed), (KeyCode::LeftShift, Pressed), (KeyCode::K, Pressed)],
        );
        assert!(fired.is_empty());
    }

    #[test]
    fn test_press_only_fires_once() {
        let (_, mut matcher) = setup(&[(1, "k")], MatcherOptions::default());
        let fired = feed(&mut matcher, &[(KeyCode::K, Pressed), (KeyCode::K, Released)]);
        assert_eq!(fired, vec![KeybindTrigger::Pressed(1)]);
    }

    #[test]
    fn test_modifier_alone_never_fires() {
        let (_, mut matcher) = setup(&[(1, "ctrl+k")], MatcherOptions::default());
        let fired = feed(&mut matcher, &[(KeyCode::LeftControl, Pressed), (KeyCode::LeftControl, Released)]);
        assert!(fired.is_empty());
    }

    #[test]
    fn test_modifiers_reported_by_platform_are_honored() {
        let (_, mut matcher) = setup(&[(1, "ctrl+k")], MatcherOptions::default());
        let event = RawKeyEvent::new(KeyCode::K, Pressed, Modifiers::new().with_ctrl(true), "test");
        assert_eq!(matcher.handle_event(&event).as_slice(), &[KeybindTrigger::Pressed(1)]);
    }

    #[test]
    fn test_all_ids_on_same_chord_fire() {
        let (_, mut matcher) = setup(&[(1, "alt+x"), (2, "alt+x")], MatcherOptions::default());
        let fired = feed(&mut matcher, &[(KeyCode::LeftAlt, Pressed), (KeyCode::X, Pressed)]);
        assert_eq!(fired, vec![KeybindTrigger::Pressed(1), KeybindTrigger::Pressed(2)]);
    }

    #[test]
    fn test_repeat_once_policy_suppresses_repeats() {
        let (_, mut matcher) = setup(&[(1, "k")], MatcherOptions::default());
        let fired = feed(
            &mut matcher,
            &[(KeyCode::K, Pressed), (KeyCode::K, Repeat), (KeyCode::K, Pressed), (KeyCode::K, Released)],
        );
        assert_eq!(fired, vec![KeybindTrigger::Pressed(1)]);

        // Новое физическое нажатие снова срабатывает
        let fired = feed(&mut matcher, &[(KeyCode::K, Pressed)]);
        assert_eq!(fired, vec![KeybindTrigger::Pressed(1)]);
    }

    #[test]
    fn test_every_repeat_policy() {
        let options = MatcherOptions {
            repeat_policy: RepeatPolicy::EveryRepeat,
            ..Default::default()
        };
        let (_, mut matcher) = setup(&[(1, "k")], options);
        let fired = feed(&mut matcher, &[(KeyCode::K, Pressed), (KeyCode::K, Repeat), (KeyCode::K, Repeat)]);
        assert_eq!(fired.len(), 3);
    }

    #[test]
    fn test_key_held_before_capture_does_not_fire_on_repeat() {
        let (_, mut matcher) = setup(&[(1, "k")], MatcherOptions::default());
        let fired = feed(&mut matcher, &[(KeyCode::K, Repeat), (KeyCode::K, Released), (KeyCode::K, Pressed)]);
        assert_eq!(fired, vec![KeybindTrigger::Pressed(1)]);
    }

    #[test]
    fn test_releases_reported_when_enabled() {
        let options = MatcherOptions {
            report_releases: true,
            ..Default::default()
        };
        let (_, mut matcher) = setup(&[(1, "ctrl+k")], options);
        let fired = feed(
            &mut matcher,
            &[
                (KeyCode::LeftControl, Pressed),
                (KeyCode::K, Pressed),
                (KeyCode::LeftControl, Released),
                (KeyCode::K, Released),
            ],
        );
        assert_eq!(fired, vec![KeybindTrigger::Pressed(1), KeybindTrigger::Released(1)]);
    }

    #[test]
    fn test_unregister_in_flight_suppresses_release() {
        let options = MatcherOptions {
            report_releases: true,
            ..Default::default()
        };
        let (registry, mut matcher) = setup(&[(1, "k")], options);
        assert_eq!(feed(&mut matcher, &[(KeyCode::K, Pressed)]), vec![KeybindTrigger::Pressed(1)]);

        registry.unregister(1);
        assert!(feed(&mut matcher, &[(KeyCode::K, Released)]).is_empty());
    }

    #[tokio::test]
    async fn test_fatal_error_closes_stream_for_all_producers() {
        use crate::error::CaptureError;
        use crate::services::dispatcher::{self, Callbacks};

        let (_, matcher) = setup(&[(1, "k")], MatcherOptions::default());
        let (failing, stream) = EventStream::channel(8);
        let other_device = failing.clone();
        let (dispatch, delivery) = dispatcher::spawn(Callbacks::new(|_| {}));

        assert!(failing.fail(CaptureError::SourceFailed("unplugged".into())).await);
        let result = matcher.run(stream, dispatch).await;
        assert!(matches!(result, Err(CaptureError::SourceFailed(_))));

        assert!(other_device.is_closed());
        assert!(!other_device.send(event(KeyCode::K, Pressed)).await);
        delivery.await.unwrap();
    }

    #[test]
    fn test_unregistered_id_no_longer_matches() {
        let (registry, mut matcher) = setup(&[(1, "k")], MatcherOptions::default());
        registry.unregister(1);
        assert!(feed(&mut matcher, &[(KeyCode::K, Pressed)]).is_empty());

        registry.register(1, Chord::parse("k").unwrap());
        let fired = feed(&mut matcher, &[(KeyCode::K, Released), (KeyCode::K, Pressed)]);
        assert_eq!(fired, vec![KeybindTrigger::Pressed(1)]);
    }
}

use glam::Vec3;

use crate::pool::{remaining_life, Slot};
use crate::surface::{FrameView, TextLabel, TextSink};

const TEXT_DURATION: f32 = 1.0;
const TEXT_RISE: f32 = 1.0;

/// A short label floating up from a world position.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FloatingText {
    pub anchor: Vec3,
    pub text: String,
    pub life: f32,
    pub age: f32,
    pub active: bool,
}

impl Slot for FloatingText {
    fn is_active(&self) -> bool {
        self.active
    }

    fn deactivate(&mut self) {
        self.active = false;
        self.life = 0.0;
    }
}

impl FloatingText {
    pub fn spawn(&mut self, anchor: Vec3, text: &str) {
        self.anchor = anchor;
        self.text.clear();
        self.text.push_str(text);
        self.life = 1.0;
        self.age = 0.0;
        self.active = true;
    }

    pub fn position(&self) -> Vec3 {
        self.anchor + Vec3::Y * (1.0 - self.life) * TEXT_RISE
    }

    /// Ages the label and shows or hides its host element for this frame.
    pub fn step<S: TextSink + ?Sized>(
        &mut self,
        dt: f32,
        slot: usize,
        view: &FrameView,
        sink: &mut S,
    ) {
        if self.active {
            self.age += dt;
            match remaining_life(self.age, TEXT_DURATION) {
                Some(life) => self.life = life,
                None => self.deactivate(),
            }
        }

        if !self.active {
            sink.hide(slot);
            return;
        }

        let world = self.position();
        match view.project(world) {
            Some(screen) => sink.show(
                slot,
                &TextLabel {
                    screen,
                    text: &self.text,
                    anchor: world,
                    opacity: self.life,
                },
            ),
            None => sink.hide(slot),
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::FloatingText;
    use crate::surface::{FrameView, TextLabel, TextSink};

    #[derive(Default)]
    struct RecordingSink {
        shown: Vec<(usize, String, f32, Vec3)>,
        hidden: Vec<usize>,
    }

    impl TextSink for RecordingSink {
        fn show(&mut self, slot: usize, label: &TextLabel<'_>) {
            self.shown
                .push((slot, label.text.to_string(), label.opacity, label.anchor));
        }

        fn hide(&mut self, slot: usize) {
            self.hidden.push(slot);
        }
    }

    #[test]
    fn labels_rise_and_fade_then_hide() {
        let view = FrameView::default();
        let mut sink = RecordingSink::default();
        let mut label = FloatingText::default();
        label.spawn(Vec3::new(0.0, 0.1, 0.0), "+1");

        label.step(0.5, 3, &view, &mut sink);
        let (slot, text, opacity, anchor) = sink.shown[0].clone();
        assert_eq!(slot, 3);
        assert_eq!(text, "+1");
        assert!((opacity - 0.5).abs() < 1e-6);
        assert!((anchor.y - 0.6).abs() < 1e-6);

        label.step(0.6, 3, &view, &mut sink);
        assert!(!label.active);
        assert_eq!(sink.hidden, vec![3]);
    }

    #[test]
    fn sixty_frames_of_a_sixtieth_hide_the_label() {
        let view = FrameView::default();
        let mut sink = RecordingSink::default();
        let mut label = FloatingText::default();
        label.spawn(Vec3::ZERO, "+1");

        for _ in 0..59 {
            label.step(1.0 / 60.0, 0, &view, &mut sink);
        }
        assert!(label.active);
        assert!(sink.hidden.is_empty());

        label.step(1.0 / 60.0, 0, &view, &mut sink);
        assert!(!label.active);
        assert_eq!(sink.hidden, vec![0]);
    }

    #[test]
    fn inactive_slots_are_hidden_every_frame() {
        let view = FrameView::default();
        let mut sink = RecordingSink::default();
        let mut label = FloatingText::default();
        label.step(0.016, 0, &view, &mut sink);
        label.step(0.016, 0, &view, &mut sink);
        assert!(sink.shown.is_empty());
        assert_eq!(sink.hidden, vec![0, 0]);
    }
}

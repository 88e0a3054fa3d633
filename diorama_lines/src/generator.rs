// Copyright 2025 the Diorama Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Interactive creation of line items.

use alloc::rc::Rc;
use glam::Vec3;

use diorama_scene::{Observers, Scene, Subscription};

use crate::config::LineConfig;
use crate::error::{Error, Result};
use crate::item::{End, LineItem};
use crate::junction::JointGenerators;

/// Template for generated items.
#[derive(Clone, Debug)]
pub struct LineItemPrototype {
    /// Width of generated items.
    pub width: f32,
    /// Joint geometry hooks handed to every generated item.
    pub generators: JointGenerators,
}

/// Builds one line item at a time from a start point and a moving end point.
///
/// `start` creates a zero-length item at the start point, `update` moves its end,
/// and `finish` hands it over, or `cancel` disposes it.
#[derive(Debug, Default)]
pub struct LineItemGenerator {
    prototype: Option<LineItemPrototype>,
    current: Option<LineItem>,
    config: LineConfig,
    finished: Observers<dyn Fn(&mut Scene, &LineItem)>,
}

impl LineItemGenerator {
    /// Create a generator without a prototype.
    pub fn new(config: LineConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Set the template for subsequent items.
    pub fn set_prototype(&mut self, prototype: LineItemPrototype) {
        self.prototype = Some(prototype);
    }

    /// The configured template.
    pub fn prototype(&self) -> Option<&LineItemPrototype> {
        self.prototype.as_ref()
    }

    /// Returns true while an item is being generated.
    pub fn is_generating(&self) -> bool {
        self.current.is_some()
    }

    /// The item being generated.
    pub fn current(&self) -> Option<&LineItem> {
        self.current.as_ref()
    }

    /// Begin a new item at `at`.
    ///
    /// Fails with [`Error::MissingPrototype`] if no prototype is set. An item still being
    /// generated is cancelled first.
    pub fn start(&mut self, scene: &mut Scene, at: Vec3) -> Result<LineItem> {
        let Some(prototype) = self.prototype.clone() else {
            return Err(Error::MissingPrototype);
        };
        if let Some(previous) = self.current.take() {
            tracing::debug!(id = previous.id(), "restarting generation; previous item cancelled");
            previous.dispose(scene);
        }
        let item = LineItem::new(
            scene,
            at,
            at,
            prototype.width,
            prototype.generators,
            self.config,
        )?;
        self.current = Some(item.clone());
        Ok(item)
    }

    /// Move the end of the item being generated.
    pub fn update(&mut self, scene: &mut Scene, to: Vec3) -> Result<()> {
        let item = self.current.as_ref().ok_or(Error::NotGenerating)?;
        item.set_end_position(scene, End::End, to);
        Ok(())
    }

    /// Complete the item being generated and notify `finished` subscribers.
    pub fn finish(&mut self, scene: &mut Scene) -> Result<LineItem> {
        let item = self.current.take().ok_or(Error::NotGenerating)?;
        for f in self.finished.snapshot() {
            f(scene, &item);
        }
        Ok(item)
    }

    /// Abandon the item being generated.
    pub fn cancel(&mut self, scene: &mut Scene) -> Result<()> {
        let item = self.current.take().ok_or(Error::NotGenerating)?;
        item.dispose(scene);
        Ok(())
    }

    /// Subscribe to finished items.
    pub fn on_finished(&mut self, f: impl Fn(&mut Scene, &LineItem) + 'static) -> Subscription {
        self.finished.subscribe(Rc::new(f))
    }

    /// Remove a `finished` subscriber.
    pub fn remove_finished(&mut self, token: Subscription) -> Result<()> {
        Ok(self.finished.unsubscribe(token)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;

    fn prototype() -> LineItemPrototype {
        LineItemPrototype {
            width: 1.5,
            generators: JointGenerators::new(),
        }
    }

    #[test]
    fn start_without_prototype_fails() {
        let mut scene = Scene::new();
        let mut generator = LineItemGenerator::new(LineConfig::default());
        assert_eq!(
            generator.start(&mut scene, Vec3::ZERO).map(|_| ()),
            Err(Error::MissingPrototype)
        );
        assert_eq!(generator.update(&mut scene, Vec3::X), Err(Error::NotGenerating));
        assert_eq!(generator.cancel(&mut scene), Err(Error::NotGenerating));
        assert!(scene.is_empty());
    }

    #[test]
    fn start_update_finish() {
        let mut scene = Scene::new();
        let mut generator = LineItemGenerator::new(LineConfig::default());
        generator.set_prototype(prototype());
        let count = Rc::new(Cell::new(0));
        let c2 = count.clone();
        generator.on_finished(move |_, item| {
            assert_eq!(item.width(), 1.5);
            c2.set(c2.get() + 1);
        });

        let item = generator.start(&mut scene, Vec3::ZERO).unwrap();
        assert_eq!(item.render_length(), 0.0);
        generator.update(&mut scene, Vec3::new(3.0, 0.0, 4.0)).unwrap();
        assert_eq!(item.render_length(), 5.0);
        let done = generator.finish(&mut scene).unwrap();
        assert!(done.ptr_eq(&item));
        assert!(!generator.is_generating());
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn restart_and_cancel_dispose_the_pending_item() {
        let mut scene = Scene::new();
        let mut generator = LineItemGenerator::new(LineConfig::default());
        generator.set_prototype(prototype());
        generator.start(&mut scene, Vec3::ZERO).unwrap();
        generator.start(&mut scene, Vec3::X).unwrap();
        assert_eq!(scene.len(), 3, "only the second item's coordinates remain");
        generator.cancel(&mut scene).unwrap();
        assert!(scene.is_empty());
    }
}

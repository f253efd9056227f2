// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::rc::Rc;

use gadget_events::{EventResult, EventType, MouseButtons, MouseEvent};
use kurbo::{Point, Rect, Size};

use crate::canvas::{Canvas, Image};
use crate::element::{BasicElement, Element, parse_number};
use crate::error::PropertyError;
use crate::types::Color;
use crate::view::EventContext;

/// Visual state of a [`ButtonElement`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum ButtonState {
    /// Idle.
    #[default]
    Normal,
    /// The pointer is over the button.
    Over,
    /// The left button is held on the button.
    Down,
    /// The element is disabled.
    Disabled,
}

/// A push button drawn from one image per state, with an optional caption.
#[derive(Clone, Debug)]
pub struct ButtonElement {
    normal: Option<Rc<dyn Image>>,
    over_image: Option<Rc<dyn Image>>,
    down_image: Option<Rc<dyn Image>>,
    disabled_image: Option<Rc<dyn Image>>,
    caption: String,
    color: Color,
    size: f64,
    over: bool,
    down: bool,
}

impl Default for ButtonElement {
    fn default() -> Self {
        Self {
            normal: None,
            over_image: None,
            down_image: None,
            disabled_image: None,
            caption: String::new(),
            color: Color::BLACK,
            size: 12.0,
            over: false,
            down: false,
        }
    }
}

impl ButtonElement {
    /// Current visual state, given the button's shared state.
    pub fn state(&self, element: &BasicElement) -> ButtonState {
        if !element.is_enabled() {
            ButtonState::Disabled
        } else if self.down {
            ButtonState::Down
        } else if self.over {
            ButtonState::Over
        } else {
            ButtonState::Normal
        }
    }

    /// Image for `state`, if one is set.
    pub fn image(&self, state: ButtonState) -> Option<&Rc<dyn Image>> {
        match state {
            ButtonState::Normal => self.normal.as_ref(),
            ButtonState::Over => self.over_image.as_ref(),
            ButtonState::Down => self.down_image.as_ref(),
            ButtonState::Disabled => self.disabled_image.as_ref(),
        }
    }

    /// Set the image for `state`.
    pub fn set_image(&mut self, state: ButtonState, image: Option<Rc<dyn Image>>) {
        let slot = match state {
            ButtonState::Normal => &mut self.normal,
            ButtonState::Over => &mut self.over_image,
            ButtonState::Down => &mut self.down_image,
            ButtonState::Disabled => &mut self.disabled_image,
        };
        *slot = image;
    }

    /// Caption text.
    pub fn caption(&self) -> &str {
        &self.caption
    }

    /// Replace the caption.
    pub fn set_caption(&mut self, caption: &str) {
        caption.clone_into(&mut self.caption);
    }

    fn set_over(&mut self, cx: &mut EventContext<'_>, over: bool) {
        if self.over != over {
            self.over = over;
            cx.queue_draw();
        }
    }

    fn set_down(&mut self, cx: &mut EventContext<'_>, down: bool) {
        if self.down != down {
            self.down = down;
            cx.queue_draw();
        }
    }
}

impl Element for ButtonElement {
    fn default_size(&self) -> Size {
        self.normal.as_ref().map_or(Size::ZERO, |i| i.size())
    }

    fn draw(&mut self, element: &BasicElement, canvas: &mut dyn Canvas) {
        let size = element.pixel_size();
        let rect = Rect::from_origin_size(Point::ZERO, size);
        let image = self
            .image(self.state(element))
            .or(self.normal.as_ref());
        if let Some(image) = image {
            canvas.draw_image(image.as_ref(), rect);
        }
        if !self.caption.is_empty() {
            canvas.draw_text(rect, &self.caption, self.size, self.color);
        }
    }

    fn handle_mouse_event(&mut self, cx: &mut EventContext<'_>, event: &MouseEvent) -> EventResult {
        match event.kind() {
            EventType::MouseOver => self.set_over(cx, true),
            EventType::MouseOut => {
                self.set_over(cx, false);
                self.set_down(cx, false);
            }
            EventType::MouseDown if event.buttons().contains(MouseButtons::LEFT) => {
                self.set_down(cx, true);
            }
            EventType::MouseUp => self.set_down(cx, false),
            _ => return EventResult::Unhandled,
        }
        EventResult::Handled
    }

    fn set_property(&mut self, name: &str, value: &str) -> Result<(), PropertyError> {
        match name {
            "caption" => self.set_caption(value),
            "color" => {
                self.color = Color::parse(value).ok_or_else(|| PropertyError::invalid(name, value))?;
            }
            "size" => {
                let size = parse_number(name, value)?;
                if size <= 0.0 {
                    return Err(PropertyError::invalid(name, value));
                }
                self.size = size;
            }
            _ => return Err(PropertyError::Unknown(name.to_owned())),
        }
        Ok(())
    }

    fn is_focusable(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kinds::MaskImage;

    #[test]
    fn default_size_follows_normal_image() {
        let mut b = ButtonElement::default();
        assert_eq!(b.default_size(), Size::ZERO);
        b.set_image(ButtonState::Normal, Some(Rc::new(MaskImage::filled(30, 12, 1.0))));
        b.set_image(ButtonState::Down, Some(Rc::new(MaskImage::filled(1, 1, 1.0))));
        assert_eq!(b.default_size(), Size::new(30.0, 12.0));
        assert!(b.image(ButtonState::Over).is_none());
    }

    #[test]
    fn caption_properties() {
        let mut b = ButtonElement::default();
        b.set_property("caption", "OK").unwrap();
        assert_eq!(b.caption(), "OK");
        assert!(b.set_property("size", "0").is_err());
        assert!(b.set_property("color", "#zz").is_err());
        assert!(matches!(
            b.set_property("href", "x"),
            Err(PropertyError::Unknown(_))
        ));
    }
}

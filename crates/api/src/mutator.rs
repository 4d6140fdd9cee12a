//! Appending a slide with a single text box.

use crate::client::SlidesApi;
use crate::requests::CreateShapeRequest;
use slides_core::Result;

/// Object id given to the text box unless the caller picks another one.
///
/// Object ids are unique per presentation, so running twice against the same
/// presentation with this id fails at the shape step.
pub const DEFAULT_TEXT_BOX_ID: &str = "MyTextBox";

/// Adds a new first slide holding one text box.
pub struct SlideMutator<'a, A: ?Sized> {
    api: &'a A,
}

impl<'a, A: SlidesApi + ?Sized> SlideMutator<'a, A> {
    pub fn new(api: &'a A) -> Self {
        Self { api }
    }

    /// Create a slide at index 0, add a text box `text_box_id` to it, and
    /// insert `text`. Returns the new slide's id.
    ///
    /// The three steps are separate remote calls. If a later step fails the
    /// slide created by the first one is left in place.
    pub fn add_slide_with_text(
        &self,
        presentation_id: &str,
        text_box_id: &str,
        text: &str,
    ) -> Result<String> {
        let slide_id = self.api.create_slide(presentation_id, 0)?;
        log::debug!("Created slide {}", slide_id);

        self.api.create_shape(
            presentation_id,
            CreateShapeRequest::text_box(text_box_id, slide_id.as_str()),
        )?;
        log::debug!("Created text box {} on slide {}", text_box_id, slide_id);

        self.api.insert_text(presentation_id, text_box_id, text, 0)?;
        log::debug!("Inserted {} characters into {}", text.chars().count(), text_box_id);

        Ok(slide_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slides_core::{
        Error, Page, PageElement, Presentation, TextContent, TextExtractor,
    };
    use std::cell::RefCell;

    /// In-memory presentation that applies requests the way the service does.
    #[derive(Default)]
    struct FakeSlides {
        presentation: RefCell<Presentation>,
        calls: RefCell<Vec<String>>,
        next_id: RefCell<usize>,
        fail_on: Option<&'static str>,
    }

    impl FakeSlides {
        fn failing_on(call: &'static str) -> Self {
            Self {
                fail_on: Some(call),
                ..Self::default()
            }
        }

        fn record(&self, call: &'static str) -> Result<()> {
            self.calls.borrow_mut().push(call.to_string());
            if self.fail_on == Some(call) {
                return Err(Error::Api {
                    status: 400,
                    message: format!("{} rejected", call),
                });
            }
            Ok(())
        }
    }

    impl SlidesApi for FakeSlides {
        fn create_slide(&self, _presentation_id: &str, insertion_index: u32) -> Result<String> {
            self.record("createSlide")?;
            let mut next = self.next_id.borrow_mut();
            *next += 1;
            let id = format!("g{}", *next);
            self.presentation
                .borrow_mut()
                .slides
                .insert(insertion_index as usize, Page::new(id.clone()));
            Ok(id)
        }

        fn create_shape(&self, _presentation_id: &str, shape: CreateShapeRequest) -> Result<()> {
            self.record("createShape")?;
            let mut presentation = self.presentation.borrow_mut();
            let page_id = shape.element_properties.page_object_id.clone();
            let slide = presentation
                .slides
                .iter_mut()
                .find(|s| s.object_id.as_deref() == Some(page_id.as_str()))
                .ok_or_else(|| Error::Api {
                    status: 400,
                    message: "no such page".into(),
                })?;
            slide
                .page_elements
                .push(PageElement::shape(shape.object_id, None));
            Ok(())
        }

        fn insert_text(
            &self,
            _presentation_id: &str,
            object_id: &str,
            text: &str,
            _insertion_index: u32,
        ) -> Result<()> {
            self.record("insertText")?;
            let mut presentation = self.presentation.borrow_mut();
            let element = presentation
                .slides
                .iter_mut()
                .flat_map(|s| s.page_elements.iter_mut())
                .find(|e| e.object_id.as_deref() == Some(object_id))
                .ok_or_else(|| Error::Api {
                    status: 400,
                    message: "no such object".into(),
                })?;
            if let Some(shape) = element.shape.as_mut() {
                shape.text = Some(TextContent::from_run(format!("{}\n", text)));
            }
            Ok(())
        }

        fn get_presentation(&self, _presentation_id: &str) -> Result<Presentation> {
            self.record("getPresentation")?;
            Ok(self.presentation.borrow().clone())
        }
    }

    #[test]
    fn test_call_sequence() {
        let api = FakeSlides::default();
        let slide_id = SlideMutator::new(&api)
            .add_slide_with_text("deck", DEFAULT_TEXT_BOX_ID, "hello")
            .unwrap();

        assert_eq!(slide_id, "g1");
        assert_eq!(
            *api.calls.borrow(),
            vec!["createSlide", "createShape", "insertText"]
        );
        let presentation = api.presentation.borrow();
        assert!(presentation.slides[0].element(DEFAULT_TEXT_BOX_ID).is_some());
    }

    #[test]
    fn test_new_slide_goes_first() {
        let api = FakeSlides::default();
        api.presentation.borrow_mut().slides.push(Page::new("existing"));

        let slide_id = SlideMutator::new(&api)
            .add_slide_with_text("deck", "box", "text")
            .unwrap();

        let presentation = api.presentation.borrow();
        assert_eq!(presentation.slides[0].object_id.as_deref(), Some(slide_id.as_str()));
        assert_eq!(presentation.slides[1].object_id.as_deref(), Some("existing"));
    }

    #[test]
    fn test_failed_shape_leaves_slide() {
        let api = FakeSlides::failing_on("createShape");
        let err = SlideMutator::new(&api)
            .add_slide_with_text("deck", DEFAULT_TEXT_BOX_ID, "hello")
            .unwrap_err();

        assert!(err.is_remote_api());
        assert_eq!(*api.calls.borrow(), vec!["createSlide", "createShape"]);
        let presentation = api.presentation.borrow();
        assert_eq!(presentation.slide_count(), 1);
        assert!(presentation.slides[0].page_elements.is_empty());
    }

    #[test]
    fn test_failed_insert_leaves_empty_box() {
        let api = FakeSlides::failing_on("insertText");
        assert!(SlideMutator::new(&api)
            .add_slide_with_text("deck", DEFAULT_TEXT_BOX_ID, "hello")
            .is_err());

        let presentation = api.presentation.borrow();
        let element = presentation.slides[0].element(DEFAULT_TEXT_BOX_ID).unwrap();
        assert_eq!(TextExtractor::new().extract(element), "");
    }

    #[test]
    fn test_multibyte_round_trip() {
        let text = "あっちょんぶりけ～！！ッ";
        let api = FakeSlides::default();
        let slide_id = SlideMutator::new(&api)
            .add_slide_with_text("deck", DEFAULT_TEXT_BOX_ID, text)
            .unwrap();

        let presentation = api.get_presentation("deck").unwrap();
        let element = presentation
            .slide(&slide_id)
            .and_then(|s| s.element(DEFAULT_TEXT_BOX_ID))
            .unwrap();

        assert_eq!(TextExtractor::new().with_trim(true).extract(element), text);
    }
}

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use imhtml::{Editor, ImageHandle, ImageProvider, ObjectKind, Options, Slot, StyledTextSink};

#[derive(Default)]
struct Store {
    images: HashMap<u32, (Vec<u8>, &'static str)>,
    refs: RefCell<HashMap<u32, i32>>,
}

impl Store {
    fn with(mut self, id: u32, data: &[u8], name: &'static str) -> Self {
        self.images.insert(id, (data.to_vec(), name));
        self
    }

    fn refs(&self, id: u32) -> i32 {
        self.refs.borrow().get(&id).copied().unwrap_or(0)
    }
}

impl ImageProvider for Store {
    fn get_image(&self, id: u32) -> Option<ImageHandle> {
        self.images.contains_key(&id).then_some(ImageHandle(id as usize))
    }

    fn get_data(&self, image: ImageHandle) -> Option<&[u8]> {
        self.images.get(&(image.0 as u32)).map(|(d, _)| d.as_slice())
    }

    fn get_filename(&self, image: ImageHandle) -> Option<&str> {
        self.images.get(&(image.0 as u32)).map(|(_, n)| *n)
    }

    fn ref_image(&self, id: u32) {
        *self.refs.borrow_mut().entry(id).or_default() += 1;
    }

    fn unref_image(&self, id: u32) {
        *self.refs.borrow_mut().entry(id).or_default() -= 1;
    }
}

fn editor(store: &Rc<Store>) -> Editor {
    let mut ed = Editor::new();
    ed.set_image_provider(Some(Box::new(Rc::clone(store))));
    ed
}

#[test]
fn img_id_inserts_placeholder_and_refs() {
    let store = Rc::new(Store::default().with(3, b"\x89PNG", "cat.png"));
    let mut ed = editor(&store);
    ed.insert_html("look <img id=\"3\"> here", Options::default());

    assert_eq!(ed.len(), 11);
    assert_eq!(ed.text(), "look [Image] here");
    assert_eq!(ed.get_markup(), "look <IMG ID=\"3\"> here");
    assert_eq!(store.refs(3), 1);
    match ed.buffer().slot(5) {
        Some(Slot::Object(obj)) => assert_eq!(
            obj.kind,
            ObjectKind::Image {
                id: 3,
                filename: Some("cat.png".into()),
                referenced: true
            }
        ),
        other => panic!("expected image, got {other:?}"),
    }
}

#[test]
fn deleting_placeholder_unrefs() {
    let store = Rc::new(Store::default().with(1, b"GIF89a", "a.gif"));
    let mut ed = editor(&store);
    ed.insert_html("<IMG ID=\"1\"><IMG ID=\"1\">", Options::default());
    assert_eq!(store.refs(1), 2);
    ed.delete(0, 1).unwrap();
    assert_eq!(store.refs(1), 1);
    ed.clear();
    assert_eq!(store.refs(1), 0);
}

#[test]
fn missing_or_empty_images_take_no_reference() {
    let store = Rc::new(Store::default().with(2, b"", "empty.png"));
    let mut ed = editor(&store);
    ed.insert_html("<img id=\"2\"><img id=\"99\">", Options::default());
    assert_eq!(ed.len(), 2);
    assert_eq!(store.refs(2), 0);
    ed.clear();
    assert_eq!(store.refs(2), 0);
    assert_eq!(store.refs(99), 0);
}

#[test]
fn no_provider_means_no_image() {
    let mut ed = Editor::new();
    ed.insert_html("a<img id=\"1\">b", Options::default());
    assert_eq!(ed.text(), "ab");
}

#[test]
fn image_format_disabled() {
    let store = Rc::new(Store::default().with(1, b"x", "x"));
    let mut ed = editor(&store);
    ed.set_format_functions(imhtml::Formats::ALL & !imhtml::Formats::IMAGE);
    ed.insert_html("<img id=\"1\"><img src=\"http://i\">", Options::default());
    assert!(ed.is_empty());
    assert_eq!(store.refs(1), 0);
}

#[test]
fn img_src_without_id_links() {
    let mut ed = Editor::new();
    ed.insert_html("<img src=\"http://host/p.png\">", Options::default());
    assert_eq!(
        ed.get_markup(),
        "<a href=\"http://host/p.png\">http://host/p.png</a>"
    );
}

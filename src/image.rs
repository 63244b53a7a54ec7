//! Host image store interface.
//!
//! `<IMG ID="N">` refers to an image the host keeps in a reference-counted
//! store. The editor resolves the id through an [`ImageProvider`] when the
//! placeholder is inserted and releases its reference when the placeholder
//! is deleted.

use std::rc::Rc;

/// Opaque token for an image resolved by a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageHandle(pub usize);

/// Access to the host's image store.
///
/// Reference counting goes through `&self`; stores that count in place use
/// interior mutability.
pub trait ImageProvider {
    fn get_image(&self, id: u32) -> Option<ImageHandle>;

    fn get_data(&self, image: ImageHandle) -> Option<&[u8]>;

    fn get_size(&self, image: ImageHandle) -> usize {
        self.get_data(image).map_or(0, <[u8]>::len)
    }

    fn get_filename(&self, image: ImageHandle) -> Option<&str>;

    fn ref_image(&self, id: u32);

    fn unref_image(&self, id: u32);
}

impl<T: ImageProvider + ?Sized> ImageProvider for Rc<T> {
    fn get_image(&self, id: u32) -> Option<ImageHandle> {
        (**self).get_image(id)
    }

    fn get_data(&self, image: ImageHandle) -> Option<&[u8]> {
        (**self).get_data(image)
    }

    fn get_size(&self, image: ImageHandle) -> usize {
        (**self).get_size(image)
    }

    fn get_filename(&self, image: ImageHandle) -> Option<&str> {
        (**self).get_filename(image)
    }

    fn ref_image(&self, id: u32) {
        (**self).ref_image(id)
    }

    fn unref_image(&self, id: u32) {
        (**self).unref_image(id)
    }
}

/// What the editor learned about an image id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ResolvedImage {
    pub filename: Option<String>,
    /// The image had data, so a store reference was taken.
    pub referenced: bool,
}

/// Look up `id` and take a reference when the store has data for it.
///
/// Unknown ids and empty images still get a placeholder, but no reference.
pub(crate) fn resolve(provider: &dyn ImageProvider, id: u32) -> ResolvedImage {
    let Some(handle) = provider.get_image(id) else {
        return ResolvedImage {
            filename: None,
            referenced: false,
        };
    };

    let has_data = provider.get_data(handle).is_some() && provider.get_size(handle) > 0;
    let filename = provider.get_filename(handle).map(str::to_string);
    if has_data {
        provider.ref_image(id);
    }
    ResolvedImage {
        filename,
        referenced: has_data,
    }
}

#[cfg(test)]
pub(crate) mod mock {
    use std::cell::RefCell;

    use rustc_hash::FxHashMap;

    use super::*;

    /// In-memory store that records reference counts.
    #[derive(Default)]
    pub struct MockStore {
        pub images: FxHashMap<u32, (Vec<u8>, Option<String>)>,
        pub refs: RefCell<FxHashMap<u32, i32>>,
    }

    impl MockStore {
        pub fn with_image(mut self, id: u32, data: &[u8], name: Option<&str>) -> Self {
            self.images
                .insert(id, (data.to_vec(), name.map(str::to_string)));
            self
        }

        pub fn refcount(&self, id: u32) -> i32 {
            self.refs.borrow().get(&id).copied().unwrap_or(0)
        }
    }

    impl ImageProvider for MockStore {
        fn get_image(&self, id: u32) -> Option<ImageHandle> {
            self.images.contains_key(&id).then_some(ImageHandle(id as usize))
        }

        fn get_data(&self, image: ImageHandle) -> Option<&[u8]> {
            self.images.get(&(image.0 as u32)).map(|(d, _)| d.as_slice())
        }

        fn get_filename(&self, image: ImageHandle) -> Option<&str> {
            self.images.get(&(image.0 as u32)).and_then(|(_, n)| n.as_deref())
        }

        fn ref_image(&self, id: u32) {
            *self.refs.borrow_mut().entry(id).or_default() += 1;
        }

        fn unref_image(&self, id: u32) {
            *self.refs.borrow_mut().entry(id).or_default() -= 1;
        }
    }
}

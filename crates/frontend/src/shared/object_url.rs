use web_sys::{File, Url};

/// Local preview URL of a picked file.
///
/// Revoked when dropped, so replacing or discarding a pending image never
/// leaks the blob.
#[derive(Debug)]
pub struct ObjectUrl(String);

impl ObjectUrl {
    pub fn for_file(file: &File) -> Option<Self> {
        match Url::create_object_url_with_blob(file) {
            Ok(url) => Some(Self(url)),
            Err(e) => {
                log::warn!("create_object_url failed: {:?}", e);
                None
            }
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Drop for ObjectUrl {
    fn drop(&mut self) {
        Url::revoke_object_url(&self.0).ok();
    }
}

/// Picked but not yet uploaded image
#[derive(Debug)]
pub struct PendingImage {
    pub file: File,
    pub preview: Option<ObjectUrl>,
}

impl PendingImage {
    pub fn new(file: File) -> Self {
        let preview = ObjectUrl::for_file(&file);
        Self { file, preview }
    }

    pub fn preview_url(&self) -> Option<String> {
        self.preview.as_ref().map(|u| u.as_str().to_string())
    }
}

/// First file picked in an `<input type="file">`
pub fn picked_file(ev: &leptos::ev::Event) -> Option<File> {
    use leptos::prelude::event_target;

    event_target::<web_sys::HtmlInputElement>(ev)
        .files()
        .and_then(|files| files.get(0))
}

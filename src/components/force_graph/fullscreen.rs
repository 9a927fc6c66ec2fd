//! Browser fullscreen API. The view only learns the outcome through the
//! document's `fullscreenchange` event.

use log::debug;
use web_sys::Element;

use super::error::GraphError;
use super::interaction::FullscreenRequest;

pub fn apply(request: FullscreenRequest, container: &Element) -> Result<(), GraphError> {
	match request {
		FullscreenRequest::Enter => container.request_fullscreen().map_err(|err| {
			debug!("fullscreen request rejected: {err:?}");
			GraphError::Fullscreen(format!("{err:?}"))
		}),
		FullscreenRequest::Exit => {
			let document = container
				.owner_document()
				.ok_or_else(|| GraphError::Fullscreen("container is detached".into()))?;
			document.exit_fullscreen();
			Ok(())
		}
	}
}

/// Whether `container` itself is the document's fullscreen element.
pub fn is_active(container: &Element) -> bool {
	container
		.owner_document()
		.and_then(|document| document.fullscreen_element())
		.is_some_and(|element| &element == container)
}

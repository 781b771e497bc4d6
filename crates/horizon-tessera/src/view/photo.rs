//! A capacity-bounded photo grid built on [`TileView`].
//!
//! `PhotoTileView` owns its own adapter over photo items, enforces a hard
//! photo cap, and reserves one placeholder tile, the "add more" affordance,
//! while under capacity. Taps and delete-overlay clicks flow back through
//! callbacks; the view never mutates application data on its own beyond
//! the photo sequence it owns.

use std::sync::Arc;

use parking_lot::Mutex;

use horizon_tessera_core::{DispatchReport, SharedUpdateQueue};

use crate::error::{ContractViolation, Error, Result};
use crate::geometry::Rect;
use crate::model::ListAdapter;

use super::container::TileView;

/// Fills a tile's visual content from its photo item.
///
/// Called once per bind. The loader owns caching, decoding, and any
/// network fetch; it may complete into the node asynchronously, but the
/// call itself must not block the layout pass.
pub trait ImageLoader<T, N>: Send + Sync {
    /// Load `item` into `node`.
    fn load(&self, node: &mut N, item: &T);
}

impl<T, N, F> ImageLoader<T, N> for F
where
    F: Fn(&mut N, &T) + Send + Sync,
{
    fn load(&self, node: &mut N, item: &T) {
        self(node, item)
    }
}

/// Whether a capacity-checked mutation was applied.
///
/// Hitting the cap is an expected outcome the caller reacts to, not an
/// error; contract violations stay in the error channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum CapacityOutcome {
    /// The mutation was applied.
    Accepted,
    /// The whole batch was rejected; nothing changed. Batches are never
    /// partially applied or truncated.
    Rejected,
}

impl CapacityOutcome {
    /// `true` when the mutation was applied.
    pub fn is_accepted(self) -> bool {
        self == Self::Accepted
    }
}

type TileClickCallback<N> = Arc<dyn Fn(&mut N, usize) -> bool + Send + Sync>;
type RequestAddCallback = Arc<dyn Fn() + Send + Sync>;

struct PhotoConfig {
    max_count: usize,
    preview: bool,
    editable: bool,
    deletable: bool,
    show_more: bool,
}

/// A photo grid with a hard capacity and an add-more placeholder.
///
/// The placeholder is always the structurally-last tile and is shown only
/// while `photo_count() < max_count()` in editable, non-preview state.
/// In preview mode the placeholder never shows and the cap does not limit
/// rendering.
pub struct PhotoTileView<T, N>
where
    T: Send + Sync + 'static,
    N: Send + Sync + 'static,
{
    adapter: Arc<ListAdapter<T, N>>,
    view: TileView<ListAdapter<T, N>>,
    config: Mutex<PhotoConfig>,
    on_request_add: Mutex<Option<RequestAddCallback>>,
    on_tile_click: Mutex<Option<TileClickCallback<N>>>,
}

impl<T, N> PhotoTileView<T, N>
where
    T: Send + Sync + 'static,
    N: Send + Sync + 'static,
{
    /// Create an empty photo view.
    ///
    /// `factory` produces blank tile nodes; `loader` fills a node from its
    /// photo item on every bind. Defaults: capacity 9, editable, deletable,
    /// placeholder enabled, preview off.
    pub fn new<F, L>(factory: F, loader: L) -> Self
    where
        F: Fn() -> N + Send + Sync + 'static,
        L: ImageLoader<T, N> + 'static,
    {
        let adapter = Arc::new(ListAdapter::empty(
            factory,
            move |item: &T, node: &mut N, _index| loader.load(node, item),
        ));
        let view = TileView::new();
        view.set_adapter(adapter.clone());

        let photo = Self {
            adapter,
            view,
            config: Mutex::new(PhotoConfig {
                max_count: 9,
                preview: false,
                editable: true,
                deletable: true,
                show_more: true,
            }),
            on_request_add: Mutex::new(None),
            on_tile_click: Mutex::new(None),
        };
        photo.refresh_reserve();
        photo
    }

    /// The underlying tile view, for layout configuration and scheduling.
    pub fn view(&self) -> &TileView<ListAdapter<T, N>> {
        &self.view
    }

    /// The photo adapter this view owns.
    pub fn adapter(&self) -> &Arc<ListAdapter<T, N>> {
        &self.adapter
    }

    /// Register the deferred-layout task on `queue`.
    pub fn connect_scheduler(&self, queue: &Arc<SharedUpdateQueue>) {
        self.view.connect_scheduler(queue);
    }

    /// Number of photos currently held.
    pub fn photo_count(&self) -> usize {
        self.adapter.len()
    }

    /// The photo capacity.
    pub fn max_count(&self) -> usize {
        self.config.lock().max_count
    }

    /// Set the photo capacity.
    ///
    /// Lowering the cap below the current count keeps the existing photos;
    /// it only stops further additions and hides the placeholder.
    pub fn set_max_count(&self, max_count: usize) {
        self.config.lock().max_count = max_count;
        self.refresh_reserve();
    }

    /// Whether preview mode is on.
    pub fn preview(&self) -> bool {
        self.config.lock().preview
    }

    /// Toggle preview mode: read-only rendering with no placeholder and no
    /// rendering cap.
    pub fn set_preview(&self, preview: bool) {
        self.config.lock().preview = preview;
        self.refresh_reserve();
    }

    /// Toggle whether the grid accepts edits.
    pub fn set_editable(&self, editable: bool) {
        self.config.lock().editable = editable;
        self.refresh_reserve();
    }

    /// Toggle the per-tile delete overlay.
    pub fn set_deletable(&self, deletable: bool) {
        self.config.lock().deletable = deletable;
        self.refresh_reserve();
    }

    /// Toggle the add-more placeholder.
    pub fn set_show_more(&self, show_more: bool) {
        self.config.lock().show_more = show_more;
        self.refresh_reserve();
    }

    /// Set the callback invoked when the placeholder is clicked.
    pub fn on_request_add<F>(&self, callback: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        *self.on_request_add.lock() = Some(Arc::new(callback));
    }

    /// Set the tile-click callback: `(node, index) -> handled`. Runs before
    /// any default behavior.
    pub fn on_tile_click<F>(&self, callback: F)
    where
        F: Fn(&mut N, usize) -> bool + Send + Sync + 'static,
    {
        *self.on_tile_click.lock() = Some(Arc::new(callback));
    }

    /// Append one photo, unless it would exceed the cap.
    pub fn add_photo(&self, item: T) -> CapacityOutcome {
        self.add_photos(vec![item])
    }

    /// Append a batch of photos.
    ///
    /// If the whole batch does not fit under the cap it is rejected as a
    /// unit; a partial add would leave the caller guessing which photos
    /// made it in. Preview mode is uncapped.
    pub fn add_photos(&self, items: Vec<T>) -> CapacityOutcome {
        if items.is_empty() {
            return CapacityOutcome::Accepted;
        }
        if self.over_cap(self.adapter.len() + items.len()) {
            tracing::debug!(
                target: "horizon_tessera::view",
                incoming = items.len(),
                current = self.adapter.len(),
                max = self.max_count(),
                "photo batch rejected at capacity"
            );
            return CapacityOutcome::Rejected;
        }
        self.surface_dispatch(self.adapter.extend(items));
        self.refresh_reserve();
        CapacityOutcome::Accepted
    }

    /// Replace all photos.
    ///
    /// Subject to the same whole-batch cap check as
    /// [`add_photos`](Self::add_photos): an over-cap replacement is
    /// rejected, leaving the current photos untouched.
    pub fn set_photos(&self, items: Vec<T>) -> CapacityOutcome {
        if self.over_cap(items.len()) {
            return CapacityOutcome::Rejected;
        }
        self.surface_dispatch(self.adapter.set_items(items));
        self.refresh_reserve();
        CapacityOutcome::Accepted
    }

    /// Remove and return the photo at `index`.
    ///
    /// When this frees the last unit of capacity the placeholder becomes
    /// visible again in the same layout pass as the removal.
    pub fn remove_photo(&self, index: usize) -> Result<T> {
        let (item, report) = self.adapter.remove(index)?;
        self.surface_dispatch(report);
        self.refresh_reserve();
        Ok(item)
    }

    /// Remove every photo.
    pub fn clear(&self) {
        self.surface_dispatch(self.adapter.clear());
        self.refresh_reserve();
    }

    /// Whether the add-more placeholder is currently part of the grid.
    pub fn placeholder_visible(&self) -> bool {
        let config = self.config.lock();
        config.editable
            && config.show_more
            && !config.preview
            && self.adapter.len() < config.max_count
    }

    /// Tiles the grid currently renders: photos plus the placeholder when
    /// visible.
    pub fn rendered_tile_count(&self) -> usize {
        self.adapter.len() + usize::from(self.placeholder_visible())
    }

    /// Geometry of the placeholder tile from the last layout pass, if it
    /// is visible and measured.
    pub fn placeholder_geometry(&self) -> Option<Rect> {
        if self.placeholder_visible() {
            self.view.node_geometry(self.adapter.len())
        } else {
            None
        }
    }

    /// Handle a tap on tile `index`.
    ///
    /// A tap on the placeholder invokes the add callback. A tap on a photo
    /// tile goes to the tile-click callback first; `false` means the
    /// caller should fall back to its default preview behavior.
    pub fn handle_tile_click(&self, index: usize) -> bool {
        if index == self.adapter.len() && self.placeholder_visible() {
            self.handle_placeholder_click();
            return true;
        }
        let callback = self.on_tile_click.lock().clone();
        if let Some(callback) = callback {
            return self
                .view
                .with_node(index, |node| callback(node, index))
                .unwrap_or(false);
        }
        false
    }

    /// Handle a tap on the placeholder.
    pub fn handle_placeholder_click(&self) {
        let callback = self.on_request_add.lock().clone();
        if let Some(callback) = callback {
            callback();
        }
    }

    /// Handle a tap on the delete overlay of tile `index`.
    ///
    /// Returns the removed photo, or `None` when deletion is disabled or
    /// the grid is in preview mode. An out-of-range index is a
    /// [`ContractViolation`].
    pub fn handle_delete_click(&self, index: usize) -> Result<Option<T>> {
        {
            let config = self.config.lock();
            if !config.deletable || !config.editable || config.preview {
                return Ok(None);
            }
        }
        if index >= self.adapter.len() {
            return Err(ContractViolation::IndexOutOfBounds {
                index,
                len: self.adapter.len(),
            }
            .into());
        }
        self.remove_photo(index).map(Some)
    }

    fn over_cap(&self, resulting_count: usize) -> bool {
        let config = self.config.lock();
        !config.preview && resulting_count > config.max_count
    }

    /// Mutations here have no caller-facing error channel for observer
    /// failures, so a dirty report is logged instead of dropped.
    fn surface_dispatch(&self, report: DispatchReport) {
        if let Some(error) = Error::from_report(report) {
            tracing::warn!(
                target: "horizon_tessera::view",
                %error,
                "observer failed while handling a photo mutation"
            );
        }
    }

    fn refresh_reserve(&self) {
        self.view
            .set_trailing_reserve(usize::from(self.placeholder_visible()));
    }
}

static_assertions::assert_impl_all!(PhotoTileView<String, ()>: Send, Sync);

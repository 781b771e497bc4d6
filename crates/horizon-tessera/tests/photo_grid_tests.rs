//! End-to-end tests for the adapter -> view -> layout pipeline.

use std::sync::Arc;

use horizon_tessera::prelude::*;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[derive(Default, Debug)]
struct Thumb {
    url: String,
}

fn photo_grid() -> (PhotoTileView<String, Thumb>, Arc<SharedUpdateQueue>) {
    init_tracing();
    let grid: PhotoTileView<String, Thumb> =
        PhotoTileView::new(Thumb::default, |node: &mut Thumb, item: &String| {
            node.url = item.clone();
        });
    grid.view().set_available_width(300.0);
    grid.view().set_spacing(TileSpacing::uniform(10.0));
    let queue = Arc::new(SharedUpdateQueue::new());
    grid.connect_scheduler(&queue);
    (grid, queue)
}

#[test]
fn test_mutation_burst_settles_in_one_pass() {
    let (grid, queue) = photo_grid();
    grid.set_max_count(9);

    assert!(grid
        .add_photos(vec!["a.jpg".into(), "b.jpg".into(), "c.jpg".into()])
        .is_accepted());
    assert!(grid.add_photo("d.jpg".into()).is_accepted());
    grid.remove_photo(0).unwrap();

    // The burst coalesced into a single deferred pass.
    assert_eq!(queue.run_pending(), 1);

    assert_eq!(grid.photo_count(), 3);
    assert_eq!(grid.view().visible_node_count(), 3);
    assert_eq!(grid.view().with_node(0, |n| n.url.clone()), Some("b.jpg".into()));
    // Photos plus the add-more placeholder.
    assert_eq!(grid.view().measured_tile_count(), 4);
}

#[test]
fn test_node_count_tracks_adapter_across_event_kinds() {
    let (grid, queue) = photo_grid();
    let adapter = grid.adapter().clone();

    assert!(grid
        .add_photos(vec!["a".into(), "b".into(), "c".into(), "d".into(), "e".into()])
        .is_accepted());
    adapter.move_range(0, 3, 2).unwrap();
    adapter.update(1, |item| item.push('!')).unwrap();
    adapter.remove(4).unwrap();
    queue.run_pending();

    assert_eq!(grid.view().visible_node_count(), adapter.len());
    assert_eq!(grid.view().with_node(3, |n| n.url.clone()), Some("a".into()));
    assert_eq!(grid.view().with_node(1, |n| n.url.clone()), Some("d!".into()));
}

#[test]
fn test_capacity_cycle_with_placeholder_geometry() {
    let (grid, queue) = photo_grid();
    grid.set_max_count(3);

    assert!(grid
        .add_photos(vec!["a".into(), "b".into(), "c".into()])
        .is_accepted());
    queue.run_pending();

    // At capacity: three photo tiles, no placeholder.
    assert!(!grid.placeholder_visible());
    assert_eq!(grid.view().measured_tile_count(), 3);
    assert_eq!(grid.add_photo("d".into()), CapacityOutcome::Rejected);

    grid.remove_photo(2).unwrap();
    queue.run_pending();

    // Back under capacity: the placeholder occupies the last grid cell.
    assert_eq!(grid.view().measured_tile_count(), 3);
    let placeholder = grid.placeholder_geometry().unwrap();
    let tile = 280.0 / 3.0;
    assert!((placeholder.origin.x - 2.0 * (tile + 10.0)).abs() < 0.01);
    assert!((placeholder.origin.y - 0.0).abs() < 0.01);
}

#[test]
fn test_preview_gallery_renders_unbounded() {
    let (grid, queue) = photo_grid();
    grid.set_max_count(4);
    grid.set_preview(true);

    let photos: Vec<String> = (0..12).map(|i| format!("p{i}.jpg")).collect();
    assert!(grid.set_photos(photos).is_accepted());
    queue.run_pending();

    assert_eq!(grid.view().visible_node_count(), 12);
    assert!(grid.placeholder_geometry().is_none());
    // 12 tiles in 3 columns make 4 rows.
    let last = grid.view().node_geometry(11).unwrap();
    let tile = 280.0 / 3.0;
    assert!((last.origin.y - 3.0 * (tile + 10.0)).abs() < 0.01);
}

#[test]
fn test_detached_grid_stops_tracking() {
    let (grid, queue) = photo_grid();
    assert!(grid.add_photo("a".into()).is_accepted());
    queue.run_pending();

    grid.view().detach();
    assert_eq!(grid.adapter().bus().observer_count(), 0);

    assert_eq!(grid.adapter().push("b".into()).delivered, 0);
    queue.run_pending();
    assert_eq!(grid.view().visible_node_count(), 0);
}

//! Photo batches, captions and removal.

use psv_inspection_lib::models::{PhotoStep, TestSelection};
use psv_inspection_lib::services::wizard::{
    IncomingFile, InspectionWizard, NoticeLevel, WizardError, WizardMode,
};

use super::test_helpers::{FAILING_CONTENT, Harness, Op, inspector};

/// Registry wizard at the first photo step.
async fn at_first_photo_step(wizard: &mut InspectionWizard) {
    wizard
        .set_mode(WizardMode::Registry, TestSelection::default())
        .unwrap();
    wizard.advance().await.unwrap();
    wizard.advance().await.unwrap();
}

#[tokio::test]
async fn test_failed_files_do_not_block_siblings() {
    let harness = Harness::new();
    let valve = harness.store.add_valve("PSV-040", None);
    let (_, wizard) = harness.open(&inspector(), &valve).await;
    let mut wizard = wizard.lock().await;
    at_first_photo_step(&mut wizard).await;
    wizard.drain_notices();

    let mut failing = FAILING_CONTENT.to_vec();
    failing.extend_from_slice(&[0; 8]);
    let stored = wizard
        .upload_photos(vec![
            IncomingFile::new("frente.jpg", vec![1; 32]),
            IncomingFile::new("laudo.pdf", vec![1; 32]),
            IncomingFile::new("placa.jpg", failing),
            IncomingFile::new("enorme.jpg", vec![1; 2048]),
        ])
        .await
        .unwrap();

    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].filename, "frente.jpg");
    assert_eq!(wizard.photos().len(), 1);
    assert_eq!(
        harness
            .store
            .photos_of(wizard.inspection_id().unwrap())
            .len(),
        1
    );

    let notices = wizard.drain_notices();
    let errors = notices
        .iter()
        .filter(|n| n.level == NoticeLevel::Error)
        .count();
    assert_eq!(errors, 3);
    assert!(notices.iter().any(|n| n.level == NoticeLevel::Success));
}

#[tokio::test]
async fn test_record_failure_removes_stored_object() {
    let harness = Harness::new();
    let valve = harness.store.add_valve("PSV-041", None);
    let (_, wizard) = harness.open(&inspector(), &valve).await;
    let mut wizard = wizard.lock().await;
    at_first_photo_step(&mut wizard).await;

    harness.store.fail(Op::InsertPhoto);
    let stored = wizard
        .upload_photos(vec![IncomingFile::new("frente.jpg", vec![1; 32])])
        .await
        .unwrap();

    assert!(stored.is_empty());
    assert!(harness.files.keys().is_empty());
    assert_eq!(harness.files.deleted().len(), 1);
    assert!(wizard.photos().is_empty());

    // The notice names the file but not the backend error
    let notices = wizard.drain_notices();
    let failure = notices
        .iter()
        .find(|n| n.level == NoticeLevel::Error)
        .unwrap();
    assert!(failure.message.contains("frente.jpg"));
    assert!(!failure.message.contains("injected"));
}

#[tokio::test]
async fn test_upload_rejected_outside_photo_steps() {
    let harness = Harness::new();
    let valve = harness.store.add_valve("PSV-042", None);
    let (_, wizard) = harness.open(&inspector(), &valve).await;
    let mut wizard = wizard.lock().await;

    wizard
        .set_mode(WizardMode::Registry, TestSelection::default())
        .unwrap();
    wizard.advance().await.unwrap();
    assert!(matches!(
        wizard
            .upload_photos(vec![IncomingFile::new("frente.jpg", vec![1; 32])])
            .await,
        Err(WizardError::WrongStep(_))
    ));

    wizard.advance().await.unwrap();
    wizard.drain_notices();
    assert!(matches!(
        wizard.upload_photos(Vec::new()).await,
        Err(WizardError::Validation(_))
    ));
    let notices = wizard.drain_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Error);
    assert_eq!(notices[0].message, "No files were sent");

    let too_many = (0..6)
        .map(|i| IncomingFile::new(format!("f{}.jpg", i), vec![1; 4]))
        .collect();
    assert!(matches!(
        wizard.upload_photos(too_many).await,
        Err(WizardError::Validation(_))
    ));
    let notices = wizard.drain_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].message, "At most 5 files per upload");
    assert!(harness.files.keys().is_empty());
}

#[tokio::test]
async fn test_batch_files_get_distinct_order() {
    let harness = Harness::new();
    let valve = harness.store.add_valve("PSV-045", None);
    let (_, wizard) = harness.open(&inspector(), &valve).await;
    let mut wizard = wizard.lock().await;
    at_first_photo_step(&mut wizard).await;

    wizard
        .upload_photos(vec![
            IncomingFile::new("a.jpg", vec![1; 8]),
            IncomingFile::new("b.jpg", vec![1; 8]),
            IncomingFile::new("c.jpg", vec![1; 8]),
        ])
        .await
        .unwrap();
    let second = wizard
        .upload_photos(vec![IncomingFile::new("d.jpg", vec![1; 8])])
        .await
        .unwrap();
    assert_eq!(second[0].order, Some(4));

    let mut orders: Vec<i32> = harness
        .store
        .photos_of(wizard.inspection_id().unwrap())
        .iter()
        .map(|p| p.record.order)
        .collect();
    orders.sort();
    assert_eq!(orders, vec![1, 2, 3, 4]);

    // Removing a photo does not hand its slot to the next upload
    let first = wizard.photos()[0].id;
    let last = wizard.photos()[3].id;
    wizard.remove_photo(first).await.unwrap();
    assert_eq!(wizard.photos().iter().find(|p| p.id == last).unwrap().order, Some(4));
    let next = wizard
        .upload_photos(vec![IncomingFile::new("e.jpg", vec![1; 8])])
        .await
        .unwrap();
    assert_eq!(next[0].order, Some(5));

    // Each step has its own sequence
    wizard.advance().await.unwrap();
    let other = wizard
        .upload_photos(vec![IncomingFile::new("f.jpg", vec![1; 8])])
        .await
        .unwrap();
    assert_eq!(other[0].order, Some(1));
}

#[tokio::test]
async fn test_photos_keep_their_step() {
    let harness = Harness::new();
    let valve = harness.store.add_valve("PSV-043", None);
    let (_, wizard) = harness.open(&inspector(), &valve).await;
    let mut wizard = wizard.lock().await;
    at_first_photo_step(&mut wizard).await;

    wizard
        .upload_photos(vec![IncomingFile::new("chegada.jpg", vec![1; 8])])
        .await
        .unwrap();
    wizard.advance().await.unwrap();
    wizard
        .upload_photos(vec![IncomingFile::new("desmontada.jpg", vec![1; 8])])
        .await
        .unwrap();

    let steps: Vec<&str> = wizard.photos().iter().map(|p| p.step.as_str()).collect();
    assert_eq!(steps, vec!["chegada", "desmontada"]);
    let stored = harness.store.photos_of(wizard.inspection_id().unwrap());
    assert!(stored.iter().any(|p| p.record.step == PhotoStep::Desmontada));
    assert!(
        harness
            .files
            .keys()
            .iter()
            .any(|k| k.contains("/desmontada/"))
    );
}

#[tokio::test]
async fn test_caption_and_remove() {
    let harness = Harness::new();
    let valve = harness.store.add_valve("PSV-044", None);
    let (_, wizard) = harness.open(&inspector(), &valve).await;
    let mut wizard = wizard.lock().await;
    at_first_photo_step(&mut wizard).await;

    let photo = wizard
        .upload_photos(vec![IncomingFile::new("frente.jpg", vec![1; 8])])
        .await
        .unwrap()
        .remove(0);

    wizard
        .update_photo_caption(photo.id, "Vista frontal".to_string())
        .await
        .unwrap();
    assert_eq!(harness.store.photo(photo.id).unwrap().caption, "Vista frontal");
    assert_eq!(
        wizard.photos()[0].caption.as_deref(),
        Some("Vista frontal")
    );

    harness.store.fail(Op::DeletePhoto);
    assert!(matches!(
        wizard.remove_photo(photo.id).await,
        Err(WizardError::RemoteWrite(_))
    ));
    assert_eq!(wizard.photos().len(), 1);
    assert!(harness.files.deleted().is_empty());

    harness.store.recover(Op::DeletePhoto);
    wizard.remove_photo(photo.id).await.unwrap();
    assert!(wizard.photos().is_empty());
    assert!(harness.store.photo(photo.id).is_none());
    assert!(harness.files.keys().is_empty());

    assert!(matches!(
        wizard.remove_photo(photo.id).await,
        Err(WizardError::NotFound(_))
    ));
}

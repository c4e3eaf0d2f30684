use anyhow::Result;
use atomic_writer::{CoalescingAtomicWriter, Error};
use atomic_writer_test_utils::{
    assert::{assert_content, assert_settled},
    init_tracing,
    mock::MockStorage,
    test_dir,
};
use pretty_assertions::assert_eq;
use std::{io::ErrorKind, time::Duration};
use tokio::runtime::Builder;

#[tokio::test]
async fn failed_write_does_not_block_queue() -> Result<()> {
    init_tracing();
    let dir = test_dir()?;
    let path = dir.path().join("isolation.txt");
    let writer =
        CoalescingAtomicWriter::with_storage(&path, MockStorage::new())?;
    writer.storage().fail_next_writes(1);

    let a = writer.write("A");
    let b = writer.write("B");
    let c = writer.write("C");

    let error = a.await.unwrap_err();
    assert!(matches!(error, Error::WriteTemp { .. }));
    assert_eq!(Some(ErrorKind::PermissionDenied), error.io_kind());

    b.await?;
    c.await?;
    assert_content(&path, "C").await?;

    let stats = writer.stats();
    assert_eq!(2, stats.generations);
    assert_eq!(1, stats.failed);
    assert!(!writer.busy());
    Ok(())
}

#[tokio::test]
async fn failure_reaches_every_coalesced_caller() -> Result<()> {
    init_tracing();
    let dir = test_dir()?;
    let path = dir.path().join("fanout.txt");
    let writer =
        CoalescingAtomicWriter::with_storage(&path, MockStorage::new())?;
    writer.storage().fail_next_writes(2);

    let a = writer.write("A");
    let b = writer.write("B");
    let c = writer.write("C");

    assert!(a.await.is_err());
    let (b, c) = futures::join!(b, c);
    assert!(matches!(b, Err(Error::WriteTemp { .. })));
    assert!(matches!(c, Err(Error::WriteTemp { .. })));
    assert!(!tokio::fs::try_exists(&path).await?);

    // Callers retry by writing again
    writer.write("D").await?;
    assert_content(&path, "D").await?;
    assert_settled(&writer).await?;
    assert_eq!(2, writer.stats().failed);
    Ok(())
}

#[tokio::test]
async fn failed_rename_keeps_previous_content() -> Result<()> {
    init_tracing();
    let dir = test_dir()?;
    let path = dir.path().join("rename.txt");
    let writer =
        CoalescingAtomicWriter::with_storage(&path, MockStorage::new())?;

    writer.write("original").await?;
    writer.storage().fail_next_renames(1);

    let error = writer.write("replacement").await.unwrap_err();
    assert!(matches!(error, Error::Rename { .. }));
    assert_eq!(Some(ErrorKind::Other), error.io_kind());
    assert_content(&path, "original").await?;
    assert_content(writer.temp_path(), "replacement").await?;

    writer.write("retry").await?;
    assert_content(&path, "retry").await?;
    assert_settled(&writer).await?;
    Ok(())
}

#[tokio::test]
async fn storage_panic_terminates_generation() -> Result<()> {
    init_tracing();
    let dir = test_dir()?;
    let path = dir.path().join("panic.txt");
    let writer =
        CoalescingAtomicWriter::with_storage(&path, MockStorage::new())?;
    writer.storage().panic_next_write();

    let a = writer.write("A");
    let b = writer.write("B");

    assert!(matches!(a.await, Err(Error::Terminated)));
    b.await?;
    assert_content(&path, "B").await?;
    assert!(!writer.busy());

    writer.write("C").await?;
    assert_content(&path, "C").await?;
    Ok(())
}

#[test]
fn runtime_shutdown_releases_writer() -> Result<()> {
    init_tracing();
    let dir = test_dir()?;
    let path = dir.path().join("shutdown.txt");
    let writer =
        CoalescingAtomicWriter::with_storage(&path, MockStorage::gated())?;

    let first = Builder::new_current_thread().enable_all().build()?;
    let (a, b) = first.block_on(async {
        let a = writer.write("A");
        let b = writer.write("B");
        writer.storage().wait_entered(1).await;
        (a, b)
    });
    assert!(writer.busy());

    // Drops the task running the generation for "A"
    drop(first);
    assert!(!writer.busy());

    let second = Builder::new_current_thread().enable_all().build()?;
    second.block_on(async {
        assert!(matches!(a.await, Err(Error::Terminated)));
        assert!(matches!(b.await, Err(Error::Terminated)));

        writer.storage().release(1);
        tokio::time::timeout(Duration::from_secs(2), writer.write("C"))
            .await??;
        assert_content(&path, "C").await?;
        assert_settled(&writer).await?;
        Ok::<_, anyhow::Error>(())
    })?;

    let stats = writer.stats();
    assert_eq!(2, stats.generations);
    assert_eq!(1, stats.failed);
    Ok(())
}

#[test]
fn write_outside_runtime_terminates() -> Result<()> {
    let dir = test_dir()?;
    let path = dir.path().join("outside.txt");
    let writer =
        CoalescingAtomicWriter::with_storage(&path, MockStorage::new())?;

    let handle = writer.write("A");
    assert!(!writer.busy());
    assert_eq!(0, writer.stats().submitted);

    let runtime = Builder::new_current_thread().build()?;
    assert!(matches!(runtime.block_on(handle), Err(Error::Terminated)));
    assert_eq!(0, writer.storage().entered());
    Ok(())
}

#[tokio::test]
async fn missing_directory_fails() -> Result<()> {
    init_tracing();
    let dir = test_dir()?;
    let path = dir.path().join("missing").join("state.txt");
    let writer = CoalescingAtomicWriter::new(&path)?;

    let error = writer.write("content").await.unwrap_err();
    assert!(matches!(error, Error::WriteTemp { .. }));
    assert_eq!(Some(ErrorKind::NotFound), error.io_kind());
    assert!(!writer.busy());

    tokio::fs::create_dir(dir.path().join("missing")).await?;
    writer.write("content").await?;
    assert_content(&path, "content").await?;
    Ok(())
}

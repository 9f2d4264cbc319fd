// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! End-to-end tests over the public API: construction, masking, file
//! round trips and format dispatch.

use std::io::Write;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use ndarray::{array, Array2};

use labdata::io::loader;
use labdata::{
    ColumnSpec, DataError, DataFile, DeleteColumns, FormatHandler, FormatRegistry, ImageStack,
    LoadOptions, ParsedFile, Result, Role, TypedMetadata,
};

fn sample_file() -> DataFile {
    let mut f = DataFile::from_columns(vec![
        ("Temperature".to_string(), vec![1.2, 2.4, 3.1]),
        ("Resistance".to_string(), vec![100.0, 102.5, 108.2]),
    ])
    .unwrap();
    f.set_setas("xy").unwrap();
    f.metadata_mut().set("Sample", "NbSe2");
    f.metadata_mut().set("Field", 0.35);
    f
}

#[test]
fn clone_is_fully_independent() {
    let original = sample_file();
    let mut copy = original.clone();

    copy.matrix_mut().mask_all(true);
    copy.metadata_mut().set("Sample", "other");
    copy.set_setas(".y").unwrap();
    copy.add_column(vec![0.0; 3], ColumnSpec::default()).unwrap();

    assert!(original.matrix().mask().iter().all(|m| !*m));
    assert_eq!(
        original.metadata().get("Sample").unwrap().as_str(),
        Some("NbSe2")
    );
    assert_eq!(original.setas().to_string(), "xy");
    assert_eq!(original.shape(), (3, 2));
}

#[test]
fn tdi_save_load_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("measurement.txt");

    let mut original = sample_file();
    original.save(Some(&path)).unwrap();

    let loaded = DataFile::load(&path).unwrap();
    assert_eq!(loaded.shape(), original.shape());
    assert_eq!(loaded.column_headers(), original.column_headers());
    for j in 0..2usize {
        assert_eq!(loaded.column(j).unwrap(), original.column(j).unwrap());
    }
    assert_eq!(
        loaded.metadata().get("Sample").unwrap().as_str(),
        Some("NbSe2")
    );
    assert_eq!(loaded.metadata().get("Field").unwrap().as_f64(), Some(0.35));
    assert_eq!(
        loaded.metadata().get("Loaded as").unwrap().as_str(),
        Some("TDI")
    );
    assert_eq!(loaded.filename().unwrap(), path);
}

#[test]
fn add_then_delete_column_restores_table() {
    let mut f = sample_file();
    let headers_before = f.column_headers().to_vec();
    let shape_before = f.shape();
    let setas_before = f.setas().to_string();

    f.add_column_with(
        |row| row.get(1).unwrap_or(0.0) / row.get(0).unwrap_or(1.0),
        ColumnSpec {
            header: Some("Ratio".to_string()),
            role: Some(Role::E),
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(f.shape(), (3, 3));
    assert_eq!(f.setas().to_string(), "xye");

    f.del_column(DeleteColumns::Selector("Ratio".into())).unwrap();
    assert_eq!(f.shape(), shape_before);
    assert_eq!(f.column_headers(), &headers_before[..]);
    assert_eq!(f.setas().to_string(), setas_before);
}

#[test]
fn mask_push_pop_restores_previous_state() {
    let mut f = sample_file();
    f.matrix_mut().mask_mut()[(1, 1)] = true;
    let before = f.matrix().mask().clone();

    let mut temporary = Array2::from_elem((3, 2), false);
    temporary[(0, 0)] = true;
    f.push_mask(Some(temporary.clone())).unwrap();
    assert_eq!(f.matrix().mask(), &temporary);

    f.pop_mask();
    assert_eq!(f.matrix().mask(), &before);

    // Popping past the sentinel leaves the file unmasked
    f.pop_mask();
    f.pop_mask();
    assert!(f.matrix().mask().iter().all(|m| !*m));
}

#[test]
fn from_columns_scenario() {
    let mut f = DataFile::from_columns(vec![
        ("Gate".to_string(), vec![0.0, 0.5, 1.0]),
        ("Current".to_string(), vec![1e-9, 4e-9, 9e-9]),
    ])
    .unwrap();
    f.set_setas("xy").unwrap();

    assert_eq!(f.shape(), (3, 2));
    assert_eq!(f.column_headers(), &["Gate", "Current"]);
    assert_eq!(f.setas().xcol(), Some(0));
    assert_eq!(f.setas().ycol(), vec![1]);
}

#[test]
fn tdi_concrete_parse_scenario() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scan.txt");
    let mut handle = std::fs::File::create(&path).unwrap();
    handle
        .write_all(
            b"TDI Format 1.5\tX\tY\n\
              User{String}=gavin\t1.5\t2.5\n\
              Timestamp{I32}=1700000000\n",
        )
        .unwrap();
    drop(handle);

    let loaded = DataFile::load(&path).unwrap();
    assert_eq!(loaded.shape(), (1, 2));
    assert_eq!(loaded.column(0usize).unwrap(), vec![1.5]);
    assert_eq!(loaded.column(1usize).unwrap(), vec![2.5]);
    assert_eq!(loaded.metadata().get("User").unwrap().as_str(), Some("gavin"));
    assert_eq!(
        loaded.metadata().get("Timestamp").unwrap().as_i64(),
        Some(1700000000)
    );
}

struct CountingHandler {
    name: &'static str,
    priority: u32,
    accept: bool,
    calls: Arc<AtomicUsize>,
}

impl FormatHandler for CountingHandler {
    fn name(&self) -> &str {
        self.name
    }
    fn priority(&self) -> u32 {
        self.priority
    }
    fn patterns(&self) -> &[&str] {
        &["*.any"]
    }
    fn parse(&self, _path: &Path) -> Result<ParsedFile> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.accept {
            let mut parsed = ParsedFile::new(array![[1.0]]);
            parsed.column_headers = vec!["only".to_string()];
            Ok(parsed)
        } else {
            Err(DataError::load(self.name, "wrong format"))
        }
    }
    fn write(&self, _path: &Path, _file: &DataFile) -> Result<()> {
        Ok(())
    }
}

#[test]
fn dispatch_attempts_handlers_in_priority_order() {
    // The accepting handler sits at position k; every handler before it
    // is attempted exactly once and none after it.
    for k in 0..3usize {
        let counters: Vec<Arc<AtomicUsize>> =
            (0..3).map(|_| Arc::new(AtomicUsize::new(0))).collect();
        let mut registry = FormatRegistry::empty();
        let names = ["alpha", "beta", "gamma"];
        for (i, name) in names.into_iter().enumerate() {
            registry.register(Box::new(CountingHandler {
                name,
                priority: (i as u32 + 1) * 8,
                accept: i == k,
                calls: counters[i].clone(),
            }));
        }

        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(b"payload").unwrap();
        let loaded =
            loader::load(f.path(), &registry, &LoadOptions::default()).unwrap();

        for (i, counter) in counters.iter().enumerate() {
            let expected = if i <= k { 1 } else { 0 };
            assert_eq!(counter.load(Ordering::SeqCst), expected, "handler {i}");
        }
        assert_eq!(
            loaded.metadata().get("Loaded as").unwrap().as_str(),
            Some(names[k])
        );
    }
}

#[test]
fn dispatch_exhaustion_names_every_attempt() {
    let counters: Vec<Arc<AtomicUsize>> =
        (0..2).map(|_| Arc::new(AtomicUsize::new(0))).collect();
    let mut registry = FormatRegistry::empty();
    registry
        .register(Box::new(CountingHandler {
            name: "alpha",
            priority: 8,
            accept: false,
            calls: counters[0].clone(),
        }))
        .register(Box::new(CountingHandler {
            name: "beta",
            priority: 16,
            accept: false,
            calls: counters[1].clone(),
        }));

    let mut f = tempfile::NamedTempFile::new().unwrap();
    f.write_all(b"payload").unwrap();
    let err = loader::load(f.path(), &registry, &LoadOptions::default()).unwrap_err();
    match err {
        DataError::UnrecognisedFormat { attempted, .. } => {
            assert_eq!(attempted, vec!["alpha".to_string(), "beta".to_string()]);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn image_stack_padding_and_get_after_set() {
    let mut stack = ImageStack::from_images(vec![
        ("small".to_string(), array![[1.0]]),
        ("big".to_string(), array![[2.0, 2.0], [2.0, 2.0]]),
    ])
    .unwrap();
    assert_eq!(stack.max_size(), (2, 2));

    // Growing one page re-pads the others without losing pixels
    stack
        .set("small", array![[5.0, 5.0, 5.0], [5.0, 5.0, 5.0], [5.0, 5.0, 5.0]], None)
        .unwrap();
    assert_eq!(stack.max_size(), (3, 3));
    assert_eq!(stack.get("big").unwrap().data, array![[2.0, 2.0], [2.0, 2.0]]);
    assert_eq!(stack.get("small").unwrap().data.dim(), (3, 3));

    // Appending by unknown name, with metadata riding along
    let mut md = TypedMetadata::new();
    md.set("polarisation", "plus");
    stack.set("extra", array![[9.0]], Some(md)).unwrap();
    assert_eq!(stack.len(), 3);
    let page = stack.get("extra").unwrap();
    assert_eq!(page.data, array![[9.0]]);
    assert_eq!(
        page.metadata.get("polarisation").unwrap().as_str(),
        Some("plus")
    );
}

#[test]
fn image_stack_contrast_ratio_workflow() {
    let plus = ImageStack::from_images(vec![("img".to_string(), array![[3.0, 6.0]])]).unwrap();
    let minus = ImageStack::from_images(vec![("img".to_string(), array![[1.0, 2.0]])]).unwrap();
    let ratio = plus.contrast_ratio(&minus).unwrap();
    assert_eq!(ratio.get(0usize).unwrap().data, array![[0.5, 0.5]]);

    // Integer stacks convert to a float kind before taking the ratio
    let ints = ImageStack::from_images(vec![("img".to_string(), array![[3i32, 6]])]).unwrap();
    let floats = ints.convert::<f64>();
    assert_eq!(
        floats.contrast_ratio(&minus).unwrap().get(0usize).unwrap().data,
        array![[0.5, 0.5]]
    );
}

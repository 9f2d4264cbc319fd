// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! 3-D-array-backed image collection.
//!
//! An [`ImageStack`] stores every page in one shared `Array3` buffer
//! sized to the largest page; smaller pages sit zero-padded in the
//! top-left corner and their true size is recorded alongside. Names,
//! sizes and per-page metadata stay in lock-step with the buffer's page
//! axis at all times.

use ndarray::{s, Array2, Array3};
use num_traits::{Float, NumCast, Zero};
use regex::Regex;
use tracing::debug;

use crate::core::error::{DataError, Result};
use crate::core::metadata::TypedMetadata;

/// An ordered collection of named 2-D images of one element kind.
#[derive(Debug, Clone)]
pub struct ImageStack<T = f64> {
    /// Shared storage, shaped `(max_rows, max_cols, pages)`
    buffer: Array3<T>,
    names: Vec<String>,
    sizes: Vec<(usize, usize)>,
    meta: Vec<TypedMetadata>,
}

/// How a page is addressed.
#[derive(Debug, Clone, Copy)]
pub enum PageKey<'a> {
    /// Position in the stack
    Index(usize),
    /// Page name; exact match first, then treated as a regex pattern
    Name(&'a str),
}

impl From<usize> for PageKey<'static> {
    fn from(ix: usize) -> Self {
        PageKey::Index(ix)
    }
}

impl<'a> From<&'a str> for PageKey<'a> {
    fn from(name: &'a str) -> Self {
        PageKey::Name(name)
    }
}

/// One image lifted out of a stack, cropped to its recorded size.
#[derive(Debug, Clone)]
pub struct ImagePage<T> {
    /// The page's name within the stack
    pub name: String,
    /// Pixel data, never padded
    pub data: Array2<T>,
    /// A copy of the page's metadata
    pub metadata: TypedMetadata,
}

impl<T: Copy + Zero + NumCast> Default for ImageStack<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Copy + Zero + NumCast> ImageStack<T> {
    /// Create an empty stack.
    pub fn new() -> Self {
        Self {
            buffer: Array3::from_elem((0, 0, 0), T::zero()),
            names: Vec::new(),
            sizes: Vec::new(),
            meta: Vec::new(),
        }
    }

    /// Adopt a whole buffer, naming pages `Untitled-0..`.
    pub fn from_array3(buffer: Array3<T>) -> Self {
        let (rows, cols, pages) = buffer.dim();
        Self {
            buffer,
            names: (0..pages).map(|p| format!("Untitled-{p}")).collect(),
            sizes: vec![(rows, cols); pages],
            meta: vec![TypedMetadata::new(); pages],
        }
    }

    /// Build a stack from named images, padding to the largest.
    pub fn from_images(images: Vec<(String, Array2<T>)>) -> Result<Self> {
        let mut stack = Self::new();
        for (name, image) in images {
            stack.insert(stack.len(), name, image, TypedMetadata::new())?;
        }
        Ok(stack)
    }

    /// Number of pages.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// True for a stack with no pages.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Page names, in stack order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Stack shape as `(pages, rows, cols)` of the shared buffer.
    pub fn shape(&self) -> (usize, usize, usize) {
        let (rows, cols, pages) = self.buffer.dim();
        (pages, rows, cols)
    }

    /// The shared buffer's page size (every page fits inside it).
    pub fn max_size(&self) -> (usize, usize) {
        let (rows, cols, _) = self.buffer.dim();
        (rows, cols)
    }

    /// Resolve a key to a page index.
    ///
    /// Names resolve by exact match first, then as a regex pattern over
    /// the page names.
    pub fn lookup(&self, key: PageKey<'_>) -> Result<usize> {
        match key {
            PageKey::Index(ix) => {
                if ix < self.len() {
                    Ok(ix)
                } else {
                    Err(DataError::index_out_of_range(ix, self.len()))
                }
            }
            PageKey::Name(name) => {
                if let Some(ix) = self.names.iter().position(|n| n == name) {
                    return Ok(ix);
                }
                if let Ok(re) = Regex::new(name) {
                    if let Some(ix) = self.names.iter().position(|n| re.is_match(n)) {
                        return Ok(ix);
                    }
                }
                Err(DataError::key_not_found(name))
            }
        }
    }

    /// Lift one page out of the stack, cropped to its recorded size.
    pub fn get<'a>(&self, key: impl Into<PageKey<'a>>) -> Result<ImagePage<T>> {
        let ix = self.lookup(key.into())?;
        let (rows, cols) = self.sizes[ix];
        Ok(ImagePage {
            name: self.names[ix].clone(),
            data: self.buffer.slice(s![..rows, ..cols, ix]).to_owned(),
            metadata: self.meta[ix].clone(),
        })
    }

    /// Store an image: overwrite an existing page, or append when the
    /// name is new.
    ///
    /// `metadata` replaces the page's metadata when given; an overwrite
    /// with `None` keeps the existing entries.
    pub fn set<'a>(
        &mut self,
        key: impl Into<PageKey<'a>>,
        image: Array2<T>,
        metadata: Option<TypedMetadata>,
    ) -> Result<()> {
        match key.into() {
            PageKey::Index(ix) => {
                if ix >= self.len() {
                    return Err(DataError::index_out_of_range(ix, self.len()));
                }
                self.overwrite(ix, image, metadata);
                Ok(())
            }
            PageKey::Name(name) => {
                match self.names.iter().position(|n| n == name) {
                    Some(ix) => self.overwrite(ix, image, metadata),
                    None => {
                        let name = name.to_string();
                        let at = self.len();
                        self.splice_in(at, name, image, metadata.unwrap_or_default());
                    }
                }
                Ok(())
            }
        }
    }

    /// Insert a new page at a position (clamped to the stack length).
    pub fn insert(
        &mut self,
        position: usize,
        name: impl Into<String>,
        image: Array2<T>,
        metadata: TypedMetadata,
    ) -> Result<()> {
        let name = name.into();
        if self.names.iter().any(|n| *n == name) {
            return Err(DataError::type_mismatch(
                "an unused page name",
                format!("duplicate '{name}'"),
            ));
        }
        let position = position.min(self.len());
        self.splice_in(position, name, image, metadata);
        Ok(())
    }

    /// Remove a page; pages above it shift down.
    pub fn delete<'a>(&mut self, key: impl Into<PageKey<'a>>) -> Result<()> {
        let ix = self.lookup(key.into())?;
        self.names.remove(ix);
        self.sizes.remove(ix);
        self.meta.remove(ix);
        let keep: Vec<usize> = (0..self.buffer.dim().2).filter(|&p| p != ix).collect();
        self.buffer = self.buffer.select(ndarray::Axis(2), &keep);
        Ok(())
    }

    /// A page's metadata.
    pub fn page_metadata<'a>(&self, key: impl Into<PageKey<'a>>) -> Result<&TypedMetadata> {
        let ix = self.lookup(key.into())?;
        Ok(&self.meta[ix])
    }

    /// Mutable access to a page's metadata.
    pub fn page_metadata_mut<'a>(
        &mut self,
        key: impl Into<PageKey<'a>>,
    ) -> Result<&mut TypedMetadata> {
        let ix = self.lookup(key.into())?;
        Ok(&mut self.meta[ix])
    }

    /// Resize the shared buffer, copying the overlapping sub-region of
    /// every page. Recorded page sizes are clamped to the new bounds.
    pub fn resize(&mut self, rows: usize, cols: usize) {
        let (mr, mc, pages) = self.buffer.dim();
        if (rows, cols) == (mr, mc) {
            return;
        }
        debug!(from = ?(mr, mc), to = ?(rows, cols), pages, "resizing stack buffer");
        let mut next = Array3::from_elem((rows, cols, pages), T::zero());
        let or = mr.min(rows);
        let oc = mc.min(cols);
        next.slice_mut(s![..or, ..oc, ..])
            .assign(&self.buffer.slice(s![..or, ..oc, ..]));
        self.buffer = next;
        for size in self.sizes.iter_mut() {
            size.0 = size.0.min(rows);
            size.1 = size.1.min(cols);
        }
    }

    /// Convert every element to another kind.
    ///
    /// Values a lossy cast cannot represent become `U`'s zero.
    pub fn convert<U: Copy + Zero + NumCast>(&self) -> ImageStack<U> {
        ImageStack {
            buffer: self
                .buffer
                .mapv(|v| num_traits::cast(v).unwrap_or_else(U::zero)),
            names: self.names.clone(),
            sizes: self.sizes.clone(),
            meta: self.meta.clone(),
        }
    }

    /// Grow the buffer so a page of `rows` x `cols` fits, re-padding
    /// every stored page. Existing pixels are never lost.
    fn ensure_capacity(&mut self, rows: usize, cols: usize) {
        let (mr, mc, _) = self.buffer.dim();
        if rows <= mr && cols <= mc {
            return;
        }
        self.resize(mr.max(rows), mc.max(cols));
    }

    fn overwrite(&mut self, ix: usize, image: Array2<T>, metadata: Option<TypedMetadata>) {
        let (rows, cols) = image.dim();
        self.ensure_capacity(rows, cols);
        self.buffer.slice_mut(s![.., .., ix]).fill(T::zero());
        self.buffer.slice_mut(s![..rows, ..cols, ix]).assign(&image);
        self.sizes[ix] = (rows, cols);
        if let Some(md) = metadata {
            self.meta[ix] = md;
        }
    }

    fn splice_in(
        &mut self,
        position: usize,
        name: String,
        image: Array2<T>,
        metadata: TypedMetadata,
    ) {
        let (rows, cols) = image.dim();
        self.ensure_capacity(rows, cols);
        let (mr, mc, pages) = self.buffer.dim();
        let mut next = Array3::from_elem((mr, mc, pages + 1), T::zero());
        if position > 0 {
            next.slice_mut(s![.., .., ..position])
                .assign(&self.buffer.slice(s![.., .., ..position]));
        }
        if position < pages {
            next.slice_mut(s![.., .., position + 1..])
                .assign(&self.buffer.slice(s![.., .., position..]));
        }
        next.slice_mut(s![..rows, ..cols, position]).assign(&image);
        self.buffer = next;
        self.names.insert(position, name);
        self.sizes.insert(position, (rows, cols));
        self.meta.insert(position, metadata);
    }
}

impl<T: Float> ImageStack<T> {
    /// Elementwise `(A - B) / (A + B)` over two stacks of the same float
    /// kind, page by page.
    ///
    /// Both stacks must have the same page count and per-page sizes.
    /// Converting element kinds first is the caller's job (see
    /// [`convert`](ImageStack::convert)).
    pub fn contrast_ratio(&self, other: &Self) -> Result<Self> {
        if self.len() != other.len() {
            return Err(DataError::type_mismatch(
                format!("a stack of {} pages", self.len()),
                format!("{} pages", other.len()),
            ));
        }
        let mut out = self.clone();
        for p in 0..self.len() {
            if self.sizes[p] != other.sizes[p] {
                return Err(DataError::type_mismatch(
                    format!("page {p} of size {:?}", self.sizes[p]),
                    format!("size {:?}", other.sizes[p]),
                ));
            }
            let (rows, cols) = self.sizes[p];
            for i in 0..rows {
                for j in 0..cols {
                    let a = self.buffer[(i, j, p)];
                    let b = other.buffer[(i, j, p)];
                    out.buffer[(i, j, p)] = (a - b) / (a + b);
                }
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn sample() -> ImageStack<f64> {
        ImageStack::from_images(vec![
            ("scan-up".to_string(), array![[1.0, 2.0], [3.0, 4.0]]),
            ("scan-down".to_string(), array![[5.0]]),
        ])
        .unwrap()
    }

    #[test]
    fn test_from_images_pads_to_largest() {
        let stack = sample();
        assert_eq!(stack.len(), 2);
        assert_eq!(stack.max_size(), (2, 2));
        assert_eq!(stack.shape(), (2, 2, 2));
        // The small page comes back cropped, never padded
        let page = stack.get("scan-down").unwrap();
        assert_eq!(page.data, array![[5.0]]);
    }

    #[test]
    fn test_from_array3_names() {
        let stack = ImageStack::from_array3(Array3::<f64>::zeros((2, 2, 3)));
        assert_eq!(stack.names(), &["Untitled-0", "Untitled-1", "Untitled-2"]);
        assert_eq!(stack.get(1usize).unwrap().name, "Untitled-1");
    }

    #[test]
    fn test_lookup_exact_then_regex_then_index() {
        let stack = sample();
        assert_eq!(stack.lookup(PageKey::Name("scan-up")).unwrap(), 0);
        // No exact match, regex kicks in
        assert_eq!(stack.lookup(PageKey::Name("down$")).unwrap(), 1);
        assert!(stack.lookup(PageKey::Name("missing")).is_err());
        assert_eq!(stack.lookup(PageKey::Index(1)).unwrap(), 1);
        assert!(stack.lookup(PageKey::Index(2)).is_err());
    }

    #[test]
    fn test_set_grows_buffer_without_losing_pixels() {
        let mut stack = sample();
        stack
            .set("scan-down", array![[9.0, 9.0, 9.0], [9.0, 9.0, 9.0], [9.0, 9.0, 9.0]], None)
            .unwrap();
        assert_eq!(stack.max_size(), (3, 3));
        // The untouched page survives the re-pad, cropped to its size
        let page = stack.get("scan-up").unwrap();
        assert_eq!(page.data, array![[1.0, 2.0], [3.0, 4.0]]);
        let grown = stack.get("scan-down").unwrap();
        assert_eq!(grown.data.dim(), (3, 3));
    }

    #[test]
    fn test_set_new_name_appends() {
        let mut stack = sample();
        stack.set("extra", array![[7.0]], None).unwrap();
        assert_eq!(stack.len(), 3);
        assert_eq!(stack.names()[2], "extra");
        assert_eq!(stack.get("extra").unwrap().data, array![[7.0]]);
    }

    #[test]
    fn test_set_overwrite_smaller_crops() {
        let mut stack = sample();
        stack.set("scan-up", array![[8.0]], None).unwrap();
        let page = stack.get("scan-up").unwrap();
        assert_eq!(page.data, array![[8.0]]);
        // Buffer keeps its old size, only the recorded size shrank
        assert_eq!(stack.max_size(), (2, 2));
    }

    #[test]
    fn test_set_index_out_of_range() {
        let mut stack = sample();
        assert!(stack.set(5usize, array![[1.0]], None).is_err());
    }

    #[test]
    fn test_insert_and_delete() {
        let mut stack = sample();
        stack
            .insert(1, "middle", array![[6.0]], TypedMetadata::new())
            .unwrap();
        assert_eq!(stack.names(), &["scan-up", "middle", "scan-down"]);
        assert_eq!(stack.get(1usize).unwrap().data, array![[6.0]]);

        assert!(stack
            .insert(0, "middle", array![[0.0]], TypedMetadata::new())
            .is_err());

        stack.delete("middle").unwrap();
        assert_eq!(stack.names(), &["scan-up", "scan-down"]);
        // Indices above the deleted page shifted down
        assert_eq!(stack.get(1usize).unwrap().name, "scan-down");
        assert!(stack.delete("middle").is_err());
    }

    #[test]
    fn test_page_metadata() {
        let mut stack = sample();
        stack
            .page_metadata_mut("scan-up")
            .unwrap()
            .set("Field", 0.5);
        assert_eq!(
            stack
                .page_metadata("scan-up")
                .unwrap()
                .get("Field")
                .unwrap()
                .as_f64(),
            Some(0.5)
        );
        // get() hands out a copy of the metadata
        let page = stack.get("scan-up").unwrap();
        assert_eq!(page.metadata.get("Field").unwrap().as_f64(), Some(0.5));
    }

    #[test]
    fn test_keys_borrowed_from_runtime_strings() {
        // Every keyed method accepts a name borrowed from a short-lived
        // String, not just literals.
        let mut stack = sample();
        let name = String::from("scan-up");
        assert_eq!(stack.get(name.as_str()).unwrap().name, "scan-up");
        stack.set(name.as_str(), array![[4.0]], None).unwrap();
        stack
            .page_metadata_mut(name.as_str())
            .unwrap()
            .set("checked", true);
        assert!(stack
            .page_metadata(name.as_str())
            .unwrap()
            .contains("checked"));
        stack.delete(name.as_str()).unwrap();
        assert_eq!(stack.names(), &["scan-down"]);
    }

    #[test]
    fn test_resize_copies_overlap() {
        let mut stack = sample();
        stack.resize(1, 2);
        assert_eq!(stack.max_size(), (1, 2));
        let page = stack.get("scan-up").unwrap();
        assert_eq!(page.data, array![[1.0, 2.0]]);
    }

    #[test]
    fn test_convert() {
        let stack = ImageStack::from_images(vec![(
            "a".to_string(),
            array![[1.2f64, 2.7]],
        )])
        .unwrap();
        let ints = stack.convert::<i32>();
        assert_eq!(ints.get("a").unwrap().data, array![[1, 2]]);
        let back = ints.convert::<f64>();
        assert_eq!(back.get("a").unwrap().data, array![[1.0, 2.0]]);
    }

    #[test]
    fn test_contrast_ratio() {
        let plus = ImageStack::from_images(vec![("p".to_string(), array![[3.0, 2.0]])]).unwrap();
        let minus = ImageStack::from_images(vec![("m".to_string(), array![[1.0, 2.0]])]).unwrap();
        let ratio = plus.contrast_ratio(&minus).unwrap();
        assert_eq!(ratio.get(0usize).unwrap().data, array![[0.5, 0.0]]);

        let mismatched =
            ImageStack::from_images(vec![("m".to_string(), array![[1.0]])]).unwrap();
        assert!(plus.contrast_ratio(&mismatched).is_err());
        let empty = ImageStack::<f64>::new();
        assert!(plus.contrast_ratio(&empty).is_err());
    }
}

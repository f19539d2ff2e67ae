// Helpers shared by the integration tests.  Not every test binary uses every helper.
#![allow(dead_code)]

use std::mem::size_of;

use gcpin::EscapeSlot;

/// A zeroed block of foreign memory holding `n` pointer cells, allocated with `malloc`.
pub struct ForeignCells {
    cells: *mut *mut u8,
    n: usize,
}

unsafe impl Send for ForeignCells {}
unsafe impl Sync for ForeignCells {}

impl ForeignCells {
    pub fn new(n: usize) -> Self {
        let cells = unsafe { libc::calloc(n.max(1), size_of::<*mut u8>()) } as *mut *mut u8;
        assert!(!cells.is_null(), "calloc failed");
        ForeignCells { cells, n }
    }

    pub fn len(&self) -> usize {
        self.n
    }

    pub fn slot(&self, i: usize) -> EscapeSlot {
        assert!(i < self.n);
        unsafe { EscapeSlot::from_ptr(self.cells.add(i)) }
    }

    /// Read cell `i` the way foreign code would.
    pub fn read(&self, i: usize) -> *mut u8 {
        assert!(i < self.n);
        unsafe { std::ptr::read_volatile(self.cells.add(i)) }
    }

    pub fn all_null(&self) -> bool {
        (0..self.n).all(|i| self.read(i).is_null())
    }
}

impl Drop for ForeignCells {
    fn drop(&mut self) {
        unsafe { libc::free(self.cells as *mut libc::c_void) }
    }
}

use core::ptr::NonNull;
use kernel_kmalloc::{FrameSource, FreeListStats, KernelHeap, MAX_ALLOC, PAGE_SIZE};

/// Page-aligned backing storage standing in for a physical frame.
#[repr(align(4096))]
struct PageBuf([u8; PAGE_SIZE]);

/// Frame-allocator double with a fixed page budget.
struct TestFrames {
    pages: Vec<Box<PageBuf>>,
    budget: usize,
}

impl TestFrames {
    fn with_budget(budget: usize) -> Self {
        Self {
            pages: Vec::new(),
            budget,
        }
    }

    fn pages_handed_out(&self) -> usize {
        self.pages.len()
    }
}

// Safety: each page is a boxed, page-aligned buffer that stays alive (and at
// a stable address) for the lifetime of the double.
unsafe impl FrameSource for TestFrames {
    fn acquire_page(&mut self) -> Option<NonNull<u8>> {
        if self.pages.len() == self.budget {
            return None;
        }
        self.pages.push(Box::new(PageBuf([0; PAGE_SIZE])));
        NonNull::new(self.pages.last_mut().unwrap().0.as_mut_ptr())
    }
}

/// The ring links back into the heap, so keep it at a stable address.
fn boxed_heap() -> Box<KernelHeap> {
    Box::new(KernelHeap::new())
}

#[test]
fn allocate_then_release_restores_the_ring() {
    let mut heap = boxed_heap();
    let mut frames = TestFrames::with_budget(1);

    // Prime the ring with its one page.
    let primer = unsafe { heap.allocate(1, &mut frames) }.unwrap();
    unsafe { heap.release(primer) };
    let baseline = heap.stats();
    assert_eq!(baseline.blocks, 1);
    assert_eq!(baseline.units * 16, PAGE_SIZE);

    for bytes in [1, 2, 15, 16, 17, 100, 1000, 2048, 4079, MAX_ALLOC] {
        let ptr = unsafe { heap.allocate(bytes, &mut frames) }.expect("fits in one page");
        unsafe { heap.release(ptr) };
        assert_eq!(heap.stats(), baseline, "size {bytes} did not round-trip");
    }
    // No additional page was ever needed.
    assert_eq!(frames.pages_handed_out(), 1);
}

#[test]
fn released_neighbors_coalesce_into_one_block() {
    let mut heap = boxed_heap();
    let mut frames = TestFrames::with_budget(1);

    let a = unsafe { heap.allocate(1000, &mut frames) }.unwrap();
    let b = unsafe { heap.allocate(1000, &mut frames) }.unwrap();
    assert_eq!(heap.stats().blocks, 1);

    unsafe { heap.release(a) };
    unsafe { heap.release(b) };
    let stats = heap.stats();
    assert_eq!(stats, FreeListStats { blocks: 1, units: PAGE_SIZE / 16 });

    // The rejoined block serves a full-page request without a new frame.
    let big = unsafe { heap.allocate(MAX_ALLOC, &mut frames) }.expect("coalesced block");
    assert_eq!(frames.pages_handed_out(), 1);
    unsafe { heap.release(big) };
}

#[test]
fn exact_fit_unlinks_the_whole_block() {
    let mut heap = boxed_heap();
    let mut frames = TestFrames::with_budget(1);

    let whole = unsafe { heap.allocate(MAX_ALLOC, &mut frames) }.unwrap();
    assert_eq!(heap.stats(), FreeListStats { blocks: 0, units: 0 });

    unsafe { heap.release(whole) };
    assert_eq!(heap.stats().blocks, 1);
}

#[test]
fn grows_one_page_at_a_time_and_fails_cleanly_when_exhausted() {
    let mut heap = boxed_heap();
    let mut frames = TestFrames::with_budget(2);

    let first = unsafe { heap.allocate(MAX_ALLOC, &mut frames) }.unwrap();
    let second = unsafe { heap.allocate(MAX_ALLOC, &mut frames) }.unwrap();
    assert_ne!(first, second);
    assert_eq!(frames.pages_handed_out(), 2);

    // Budget spent: the next request must fail without disturbing the ring.
    let before = heap.stats();
    assert!(unsafe { heap.allocate(16, &mut frames) }.is_none());
    assert_eq!(heap.stats(), before);

    unsafe { heap.release(first) };
    unsafe { heap.release(second) };
}

#[test]
fn allocations_do_not_overlap() {
    let mut heap = boxed_heap();
    let mut frames = TestFrames::with_budget(2);

    let a = unsafe { heap.allocate(256, &mut frames) }.unwrap();
    let b = unsafe { heap.allocate(256, &mut frames) }.unwrap();
    unsafe {
        core::ptr::write_bytes(a.as_ptr(), 0xAA, 256);
        core::ptr::write_bytes(b.as_ptr(), 0x55, 256);
        assert!(core::slice::from_raw_parts(a.as_ptr(), 256)
            .iter()
            .all(|&byte| byte == 0xAA));
        assert!(core::slice::from_raw_parts(b.as_ptr(), 256)
            .iter()
            .all(|&byte| byte == 0x55));
        heap.release(a);
        heap.release(b);
    }
}

#[test]
#[should_panic(expected = "exceeds a single page")]
fn oversized_request_is_a_contract_violation() {
    let mut heap = boxed_heap();
    let mut frames = TestFrames::with_budget(1);
    let _ = unsafe { heap.allocate(MAX_ALLOC + 1, &mut frames) };
}

#[test]
#[should_panic(expected = "zero-size request")]
fn zero_size_request_is_a_contract_violation() {
    let mut heap = boxed_heap();
    let mut frames = TestFrames::with_budget(1);
    let _ = unsafe { heap.allocate(0, &mut frames) };
}

#[test]
fn locked_wrapper_round_trips() {
    use kernel_kmalloc::LockedKernelHeap;

    let heap = Box::new(LockedKernelHeap::new());
    let mut frames = TestFrames::with_budget(1);

    let ptr = unsafe { heap.allocate(48, &mut frames) }.unwrap();
    assert!(heap.stats().units > 0);
    unsafe { heap.release(ptr) };
    assert_eq!(heap.stats(), FreeListStats { blocks: 1, units: PAGE_SIZE / 16 });
}

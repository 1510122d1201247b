pub mod agch_queue;
pub mod paging;

pub use agch_queue::{AgchQueue, MACBLOCK_LEN, compute_capacity, fill_next_slot, update_capacity};
pub use paging::{PagingGenerator, PagingQueue};

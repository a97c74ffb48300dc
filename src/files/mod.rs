// File transfer module

mod transfer;

pub use transfer::{FileTransferManager, TransferStatus};

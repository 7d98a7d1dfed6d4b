#![warn(clippy::pedantic)]

pub mod local_storage;
pub mod memory;

pub use local_storage::LocalStorage;
pub use memory::MemoryStorage;

#[cfg(test)]
mod tests {
    pub mod data;
}

pub mod version;
mod version17;
mod version23;
mod version26;
mod version30;

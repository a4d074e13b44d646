use crate::selected_file::SelectedFile;

/// Revocable reference to a decoded preview of the selected file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PreviewHandle(pub u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

pub trait PreviewStore: Send + Sync {
    fn create(
        &self,
        handle: PreviewHandle,
        file: &SelectedFile,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
    fn release(&self, handle: PreviewHandle);
    fn get(&self, handle: PreviewHandle) -> Option<PreviewImage>;
    fn len(&self) -> usize;
}

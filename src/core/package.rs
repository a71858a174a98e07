use crate::core::constant::{DEFAULT_BUFFER_SIZE, MEDIA_PATH_PREFIX};
use crate::public::error::DocxError;
use async_zip::error::ZipError;
use async_zip::tokio::read::seek::ZipFileReader;
use async_zip::tokio::write::ZipFileWriter;
use async_zip::{Compression, ZipEntryBuilder};
use bytes::Bytes;
use std::path::{Path, PathBuf};
use tokio::fs::File as AsyncFile;
use tokio::io::{AsyncReadExt, AsyncWriteExt, BufReader, BufWriter};
use tokio_util::compat::FuturesAsyncReadCompatExt;

/// Opened document package / 已打开的文档包
///
/// Every entry is held in memory in archive order; edits are applied to the entry list and the
/// whole package is rewritten at its path on [`Package::close`].
/// 所有条目按归档顺序保存在内存中，关闭时整体重写。
pub(crate) struct Package {
    path: PathBuf,
    entries: Vec<(String, Bytes)>,
}

impl Package {
    /// Open a package and read all entries / 打开文档包并读取所有条目
    pub(crate) async fn open(path: &Path) -> Result<Self, DocxError> {
        let file = AsyncFile::open(path).await?;
        let reader = BufReader::new(file);
        let mut zip_stream = ZipFileReader::with_tokio(reader).await?;

        let entries_len = zip_stream.file().entries().len();
        let mut entries = Vec::with_capacity(entries_len);
        for index in 0..entries_len {
            let entry = &zip_stream.file().entries()[index];
            let filename = entry.filename().as_str()?.to_string();
            // Skip directories / 跳过目录
            if filename.ends_with('/') {
                continue;
            }

            let entry_reader = zip_stream.reader_with_entry(index).await?;
            let mut content = Vec::with_capacity(DEFAULT_BUFFER_SIZE);
            entry_reader.compat().read_to_end(&mut content).await?;
            entries.push((filename, Bytes::from(content)));
        }

        Ok(Self {
            path: path.to_path_buf(),
            entries,
        })
    }

    /// Package at `path` holding `entries`, written on [`Package::close`]
    #[cfg(test)]
    pub(crate) fn from_entries(path: &Path, entries: Vec<(String, Bytes)>) -> Self {
        Self {
            path: path.to_path_buf(),
            entries,
        }
    }

    /// Entry bytes (cheap clone of `Bytes`) / 条目字节
    pub(crate) fn read_entry(&self, name: &str) -> Option<Bytes> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, data)| data.clone())
    }

    /// Entry decoded as UTF-8 text / 以 UTF-8 解码的条目文本
    pub(crate) fn read_entry_string(&self, name: &str) -> Result<Option<String>, DocxError> {
        match self.read_entry(name) {
            Some(data) => String::from_utf8(data.to_vec())
                .map(Some)
                .map_err(|_| DocxError::InvalidPart(name.to_string())),
            None => Ok(None),
        }
    }

    /// Create or overwrite an entry; an existing entry keeps its position
    /// 创建或覆盖条目，已存在的条目保持原位置
    pub(crate) fn write_entry(&mut self, name: &str, data: Bytes) {
        match self.entries.iter_mut().find(|(n, _)| n == name) {
            Some((_, existing)) => *existing = data,
            None => self.entries.push((name.to_string(), data)),
        }
    }

    /// Remove an entry, returns whether it existed / 删除条目，返回其是否存在
    pub(crate) fn delete_entry(&mut self, name: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(n, _)| n != name);
        self.entries.len() != before
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    /// Write every entry back to the package path / 将所有条目写回文档包路径
    ///
    /// Consumes the package so it is finalized exactly once.
    pub(crate) async fn close(self) -> Result<PathBuf, DocxError> {
        match self.write_all().await {
            Ok(()) => Ok(self.path),
            Err(source) => Err(DocxError::ArchiveCloseFailed {
                path: self.path,
                source,
            }),
        }
    }

    async fn write_all(&self) -> Result<(), ZipError> {
        let output_file = AsyncFile::create(&self.path).await?;
        // Wrap in BufWriter to optimize zip metadata writes / 包装在 BufWriter 中以优化 zip 元数据写入
        let mut writer = ZipFileWriter::with_tokio(BufWriter::new(output_file));

        for (name, data) in &self.entries {
            // Media is already compressed / 媒体文件本身已压缩
            let compression = if name.starts_with(MEDIA_PATH_PREFIX) {
                Compression::Stored
            } else {
                Compression::Deflate
            };
            let options = ZipEntryBuilder::new(name.clone().into(), compression);
            writer.write_entry_whole(options, data).await?;
        }

        let mut buffered = writer.close().await?.into_inner();
        buffered.flush().await?;
        Ok(())
    }
}

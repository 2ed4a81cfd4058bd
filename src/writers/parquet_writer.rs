use crate::error::{ProcessingError, Result};
use crate::utils::constants::{
    COMPRESSION_GZIP, COMPRESSION_LZ4, COMPRESSION_NONE, COMPRESSION_SNAPPY, COMPRESSION_ZSTD,
    DEFAULT_ROW_GROUP_SIZE,
};
use arrow::array::{ArrayRef, BooleanArray, Date32Array, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::basic::{Compression, GzipLevel, ZstdLevel};
use parquet::file::properties::WriterProperties;
use polars::prelude::{DataFrame, DataType as FrameType, Series};
use std::fs::{self, File};
use std::path::Path;
use std::sync::Arc;

pub struct ParquetWriter {
    compression: Compression,
}

impl ParquetWriter {
    pub fn new() -> Self {
        Self {
            compression: Compression::SNAPPY,
        }
    }

    pub fn with_compression(mut self, compression: &str) -> Result<Self> {
        self.compression = match compression.to_lowercase().as_str() {
            COMPRESSION_SNAPPY => Compression::SNAPPY,
            COMPRESSION_GZIP => Compression::GZIP(GzipLevel::default()),
            COMPRESSION_LZ4 => Compression::LZ4,
            COMPRESSION_ZSTD => Compression::ZSTD(ZstdLevel::default()),
            COMPRESSION_NONE => Compression::UNCOMPRESSED,
            _ => {
                return Err(ProcessingError::Config(format!(
                    "Unsupported compression: {}",
                    compression
                )))
            }
        };
        Ok(self)
    }

    /// Write a frame to a Parquet file, overwriting `path`
    pub fn write_frame(&self, frame: &DataFrame, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let batch = self.frame_to_batch(frame)?;

        let file = File::create(path)?;
        let props = WriterProperties::builder()
            .set_compression(self.compression)
            .set_max_row_group_size(DEFAULT_ROW_GROUP_SIZE)
            .build();

        let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(props))?;
        writer.write(&batch)?;
        writer.close()?;

        Ok(())
    }

    /// One record batch mirroring the frame; every field nullable. Integer
    /// columns are widened to Int64, floats to Float64, and anything
    /// without a direct mapping is written as text.
    fn frame_to_batch(&self, frame: &DataFrame) -> Result<RecordBatch> {
        let mut fields = Vec::with_capacity(frame.width());
        let mut arrays: Vec<ArrayRef> = Vec::with_capacity(frame.width());

        for column in frame.get_columns() {
            let series = column.as_materialized_series();
            let (data_type, array) = to_arrow(series)?;
            fields.push(Field::new(series.name().as_str(), data_type, true));
            arrays.push(array);
        }

        Ok(RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)?)
    }

    pub fn get_file_info(&self, path: &Path) -> Result<ParquetFileInfo> {
        use parquet::file::reader::{FileReader, SerializedFileReader};

        let file = File::open(path)?;
        let reader = SerializedFileReader::new(file)?;
        let metadata = reader.metadata();

        let file_metadata = metadata.file_metadata();
        let row_groups = metadata.num_row_groups();
        let total_rows = file_metadata.num_rows();
        let num_columns = file_metadata.schema_descr().num_columns();
        let file_size = fs::metadata(path)?.len();

        Ok(ParquetFileInfo {
            total_rows,
            num_columns,
            row_groups: row_groups as i32,
            file_size,
            compression: self.compression,
        })
    }
}

impl Default for ParquetWriter {
    fn default() -> Self {
        Self::new()
    }
}

fn to_arrow(series: &Series) -> Result<(DataType, ArrayRef)> {
    let dtype = series.dtype();
    let converted: (DataType, ArrayRef) = if dtype == &FrameType::Date {
        // days since the epoch, as Date32 stores them
        let days: Vec<Option<i32>> = series.date()?.physical().into_iter().collect();
        (DataType::Date32, Arc::new(Date32Array::from(days)))
    } else if dtype.is_integer() {
        let values: Vec<Option<i64>> = series.cast(&FrameType::Int64)?.i64()?.into_iter().collect();
        (DataType::Int64, Arc::new(Int64Array::from(values)))
    } else if dtype.is_float() {
        let values: Vec<Option<f64>> = series.cast(&FrameType::Float64)?.f64()?.into_iter().collect();
        (DataType::Float64, Arc::new(Float64Array::from(values)))
    } else if dtype == &FrameType::Boolean {
        let values: Vec<Option<bool>> = series.bool()?.into_iter().collect();
        (DataType::Boolean, Arc::new(BooleanArray::from(values)))
    } else {
        let text = series.cast(&FrameType::String)?;
        let values: Vec<Option<&str>> = text.str()?.into_iter().collect();
        (DataType::Utf8, Arc::new(StringArray::from(values)))
    };
    Ok(converted)
}

#[derive(Debug)]
pub struct ParquetFileInfo {
    pub total_rows: i64,
    pub num_columns: usize,
    pub row_groups: i32,
    pub file_size: u64,
    pub compression: Compression,
}

impl ParquetFileInfo {
    pub fn summary(&self) -> String {
        format!(
            "Parquet File Summary:\n\
            - Total rows: {}\n\
            - Columns: {}\n\
            - Row groups: {}\n\
            - File size: {:.2} MB\n\
            - Compression: {:?}",
            self.total_rows,
            self.num_columns,
            self.row_groups,
            self.file_size as f64 / 1_048_576.0, // Convert to MB
            self.compression,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::Array;
    use chrono::NaiveDate;
    use polars::prelude::{DateChunked, IntoColumn, IntoSeries, NamedFrom};
    use tempfile::NamedTempFile;

    fn sample_frame() -> DataFrame {
        let dates = DateChunked::from_naive_date_options(
            "data_inversa".into(),
            [NaiveDate::from_ymd_opt(2022, 6, 1), None],
        );
        DataFrame::new(vec![
            Series::new("id".into(), &[1i64, 2]).into_column(),
            dates.into_series().into_column(),
            Series::new("km".into(), &[Some(10.5f64), None]).into_column(),
            Series::new("uf".into(), &["SC", "PR"]).into_column(),
        ])
        .unwrap()
    }

    #[test]
    fn test_write_frame() -> Result<()> {
        let writer = ParquetWriter::new();
        let temp_file = NamedTempFile::new()?;

        writer.write_frame(&sample_frame(), temp_file.path())?;

        let info = writer.get_file_info(temp_file.path())?;
        assert_eq!(info.total_rows, 2);
        assert_eq!(info.num_columns, 4);
        assert!(info.file_size > 0);

        Ok(())
    }

    #[test]
    fn test_arrow_types_follow_frame_types() -> Result<()> {
        let batch = ParquetWriter::new().frame_to_batch(&sample_frame())?;
        let schema = batch.schema();

        assert_eq!(schema.field(0).data_type(), &DataType::Int64);
        assert_eq!(schema.field(1).data_type(), &DataType::Date32);
        assert_eq!(schema.field(2).data_type(), &DataType::Float64);
        assert_eq!(schema.field(3).data_type(), &DataType::Utf8);

        let days = batch
            .column(1)
            .as_any()
            .downcast_ref::<Date32Array>()
            .unwrap();
        // 2022-06-01 is 19144 days after 1970-01-01
        assert_eq!(days.value(0), 19144);
        assert!(days.is_null(1));

        Ok(())
    }

    #[test]
    fn test_different_compressions() -> Result<()> {
        let compressions = ["snappy", "gzip", "lz4", "zstd", "none"];

        for compression in &compressions {
            let writer = ParquetWriter::new().with_compression(compression)?;
            let temp_file = NamedTempFile::new()?;

            writer.write_frame(&sample_frame(), temp_file.path())?;

            let metadata = std::fs::metadata(temp_file.path())?;
            assert!(metadata.len() > 0, "Failed for compression: {}", compression);
        }

        Ok(())
    }

    #[test]
    fn test_invalid_compression() {
        assert!(ParquetWriter::new().with_compression("bzip9").is_err());
    }
}

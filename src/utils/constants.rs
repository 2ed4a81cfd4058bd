/// Source layout
pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_OUTPUT_FILE: &str = "acidentes_consolidados.csv";
pub const SEMICOLON_GROUP_FILES: [&str; 2] = ["2021.csv", "2022.csv"];
pub const COMMA_GROUP_FILES: [&str; 2] = ["2023.csv", "2024.csv"];

/// Encoding labels (resolved through the WHATWG label table)
pub const LEGACY_ENCODING: &str = "latin1";
pub const MODERN_ENCODING: &str = "utf-8";
pub const LEGACY_ENCODING_YEARS: [&str; 2] = ["2021", "2023"];
pub const MODERN_ENCODING_YEARS: [&str; 2] = ["2022", "2024"];

/// Environment variable prefix for configuration overrides
pub const ENV_PREFIX: &str = "ACIDENTES";

/// Source column names
pub const ID_COLUMN: &str = "id";
pub const DATE_COLUMN: &str = "data_inversa";
pub const TIME_COLUMN: &str = "horario";
pub const STATE_COLUMN: &str = "uf";
pub const KM_COLUMN: &str = "km";
pub const ACCIDENT_TYPE_COLUMN: &str = "tipo_acidente";
pub const PEOPLE_COLUMN: &str = "pessoas";
pub const DEATHS_COLUMN: &str = "mortos";
pub const LIGHT_INJURIES_COLUMN: &str = "feridos_leves";
pub const SEVERE_INJURIES_COLUMN: &str = "feridos_graves";
pub const UNINJURED_COLUMN: &str = "ilesos";
pub const UNKNOWN_COLUMN: &str = "ignorados";
pub const INJURED_COLUMN: &str = "feridos";
pub const VEHICLES_COLUMN: &str = "veiculos";

/// Derived column names
pub const YEAR_COLUMN: &str = "ano";
pub const WEEKDAY_COLUMN: &str = "dia_da_semana";
pub const MONTH_COLUMN: &str = "mes";
pub const MONTH_NAME_COLUMN: &str = "nome_mes";
pub const HOLIDAY_COLUMN: &str = "feriado";
pub const TIME_BUCKET_COLUMN: &str = "periodo_dia";
pub const INVOLVEMENT_COLUMN: &str = "nivel_envolvimento";

/// Holiday flag values
pub const HOLIDAY_YES: &str = "Sim";
pub const HOLIDAY_NO: &str = "Não";

/// The 26 states plus the Federal District
pub const VALID_UF_CODES: [&str; 27] = [
    "AC", "AL", "AP", "AM", "BA", "CE", "DF", "ES", "GO", "MA", "MT", "MS", "MG", "PA", "PB", "PR",
    "PE", "PI", "RJ", "RN", "RS", "RO", "RR", "SC", "SP", "SE", "TO",
];

/// Cell contents read as null, matching the usual dataframe NA tokens
pub const NULL_TOKENS: [&str; 19] = [
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Accepted date layouts, tried in order
pub const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%d/%m/%Y", "%Y/%m/%d", "%d-%m-%Y"];
pub const OUTPUT_DATE_FORMAT: &str = "%Y-%m-%d";

/// Involvement tier upper bounds (inclusive)
pub const LOW_INVOLVEMENT_MAX: f64 = 5.0;
pub const MEDIUM_INVOLVEMENT_MAX: f64 = 20.0;

/// Processing defaults
pub const DEFAULT_ROW_GROUP_SIZE: usize = 10000;
pub const DEFAULT_PREVIEW_ROWS: usize = 20;

/// Parquet compression options
pub const COMPRESSION_SNAPPY: &str = "snappy";
pub const COMPRESSION_GZIP: &str = "gzip";
pub const COMPRESSION_LZ4: &str = "lz4";
pub const COMPRESSION_ZSTD: &str = "zstd";
pub const COMPRESSION_NONE: &str = "none";

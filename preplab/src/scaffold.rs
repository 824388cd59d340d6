//! Sample submission offered to learners as a starting point.

/// Suggested file name for the downloaded scaffold.
pub const SCAFFOLD_FILE_NAME: &str = "answer.py";

/// The scaffold contains a stub transform and the canonical entry-point
/// guard, so an unedited download already satisfies both validator checks and
/// the runner's invocation contract (read `sys.argv[1]`, write `after.csv`).
pub const SAMPLE_SCAFFOLD: &str = r#"import sys

import pandas as pd


def preprocess(df):
    # Implement the transformation here.
    return df


if __name__ == "__main__":
    input_file = sys.argv[1]
    df = pd.read_csv(input_file)
    processed_df = preprocess(df)
    processed_df.to_csv("after.csv", index=False)
"#;

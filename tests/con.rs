#![cfg(feature="db-tests")]

mod tests {
    use ora::*;

    fn open_con() -> Result<Con> {
        let dbname = std::env::var("DBNAME").expect("database name");
        let dbuser = std::env::var("DBUSER").expect("user name");
        let dbpass = std::env::var("DBPASS").expect("password");

        let env = drv().open_env()?;
        env.open_con(&format!("{}/{}@{}", dbuser, dbpass, dbname))
    }

    fn recreate(con: &Con, name: &str, columns: &str) -> Result<()> {
        con.exec(&format!("
            BEGIN
                EXECUTE IMMEDIATE 'DROP TABLE {}';
            EXCEPTION
                WHEN OTHERS THEN
                    IF sqlcode != -942 THEN
                        RAISE;
                    END IF;
            END;
        ", name), &mut [])?;
        con.exec(&format!("CREATE TABLE {} ({})", name, columns), &mut [])?;
        Ok(())
    }

    #[test]
    fn last_insert_id() -> Result<()> {
        let con = open_con()?;
        recreate(&con, "test_con_ids", "c1 NUMBER(19,0) GENERATED ALWAYS AS IDENTITY, c2 VARCHAR2(48)")?;

        let res = con.exec(
            "INSERT INTO test_con_ids (c2) VALUES ('x') RETURNING c1 /*lastInsertId*/ INTO :c1",
            &mut [Value::Null.into()]
        )?;
        assert_eq!(res.rows_affected, 1);
        assert_eq!(res.last_insert_id, Some(1));

        let res = con.exec("INSERT INTO test_con_ids (c2) VALUES ('y')", &mut [])?;
        assert_eq!(res.rows_affected, 1);
        assert_eq!(res.last_insert_id, None);
        Ok(())
    }

    #[test]
    fn nulls_collapse_to_zero_values() -> Result<()> {
        let con = open_con()?;
        recreate(&con, "test_con_nulls", "c0 NUMBER(3), c1 VARCHAR2(48 CHAR), c2 BINARY_FLOAT")?;

        con.exec("INSERT INTO test_con_nulls (c0, c1, c2) VALUES (:1, :2, :3)", &mut [
            Arg::arr(vec![1, 2, 3]),
            Arg::arr_as(vec![Some("a"), None, Some("b")], ColumnType::OraStr),
            Arg::arr(vec![0.5f64, 1.5, 2.5]),
        ])?;

        let rset = con.query("SELECT c1, c2 FROM test_con_nulls ORDER BY c0", &mut [])?;
        assert_eq!(rset.columns()[1].gct, ColumnType::F64);
        let mut vals = Vec::new();
        while let Some(row) = rset.next()? {
            vals.push(row.get::<String, _>(0)?);
            assert!(matches!(row.value(1)?, Value::F64(_)));
        }
        assert_eq!(vals, vec!["a", "", "b"]);
        Ok(())
    }

    #[test]
    fn transactions() -> Result<()> {
        let con = open_con()?;
        recreate(&con, "test_con_tx", "c1 NUMBER(9)")?;

        let tx = con.begin()?;
        con.exec("INSERT INTO test_con_tx (c1) VALUES (:1)", &mut [1.into()])?;
        tx.rollback()?;

        let rset = con.query("SELECT count(*) FROM test_con_tx", &mut [])?;
        let row = rset.next()?.expect("one row");
        assert_eq!(row.get::<i64, _>(0)?, 0);
        Ok(())
    }

    #[test]
    fn closed_connections() -> Result<()> {
        let con = open_con()?;
        con.ping()?;
        con.close()?;
        assert!(!con.is_open());
        let res = con.exec("SELECT 1 FROM dual", &mut []);
        assert!(matches!(res, Err(ref err) if err.kind() == ErrorKind::Protocol));
        con.close()?;
        Ok(())
    }
}

#![cfg(feature="db-tests")]

mod tests {
    use ora::*;

    fn open_ses() -> Result<Ses> {
        let dbname = std::env::var("DBNAME").expect("database name");
        let dbuser = std::env::var("DBUSER").expect("user name");
        let dbpass = std::env::var("DBPASS").expect("password");

        let env = drv().open_env()?;
        let srv = env.open_srv(&SrvCfg::new(&dbname))?;
        srv.open_ses(&SesCfg::new(&dbuser, &dbpass))
    }

    fn setup(ses: &Ses) -> Result<()> {
        ses.prep_and_exe("
            BEGIN
                EXECUTE IMMEDIATE 'DROP TABLE test_cursor_rows';
            EXCEPTION
                WHEN OTHERS THEN
                    IF sqlcode != -942 THEN
                        RAISE;
                    END IF;
            END;
        ", &mut [])?;
        ses.prep_and_exe("CREATE TABLE test_cursor_rows (c1 NUMBER(9), c2 VARCHAR2(8))", &mut [])?;
        ses.prep_and_exe("INSERT INTO test_cursor_rows (c1, c2) VALUES (:1, :2)", &mut [
            Arg::arr(vec![5, 7, 9]),
            Arg::arr(vec!["a", "b", "c"]),
        ])?;
        ses.prep_and_exe("
            CREATE OR REPLACE PROCEDURE test_cursor_proc (p_rset OUT SYS_REFCURSOR) AS
            BEGIN
                OPEN p_rset FOR SELECT c1, c2 FROM test_cursor_rows ORDER BY c1;
            END;
        ", &mut [])?;
        Ok(())
    }

    fn collect(rset: &Rset) -> Result<Vec<(i64, String)>> {
        let mut rows = Vec::new();
        while let Some(row) = rset.next()? {
            rows.push((row.get(0)?, row.get(1)?));
        }
        Ok(rows)
    }

    #[test]
    fn procedure_out_cursor() -> Result<()> {
        let ses = open_ses()?;
        setup(&ses)?;

        let stmt = ses.prep("CALL test_cursor_proc(:1)")?;
        let mut rset = None;
        stmt.exe(&mut [Arg::cursor(&mut rset)])?;
        let rset = rset.expect("cursor");
        assert_eq!(collect(&rset)?, vec![(5, "a".to_string()), (7, "b".to_string()), (9, "c".to_string())]);
        assert!(rset.next()?.is_none());
        assert_eq!(rset.len(), 3);
        Ok(())
    }

    #[test]
    fn cursor_columns() -> Result<()> {
        let ses = open_ses()?;
        setup(&ses)?;

        let rset = ses.prep_and_qry("
            SELECT c1, CURSOR(SELECT c2 FROM test_cursor_rows i WHERE i.c1 = o.c1) AS c2s
              FROM test_cursor_rows o
          ORDER BY c1
        ", &mut [])?;
        let mut names = Vec::new();
        while let Some(mut row) = rset.next()? {
            let nested = row.take(1).into_rset()?;
            while let Some(row) = nested.next()? {
                names.push(row.get::<String, _>(0)?);
            }
            nested.close()?;
        }
        assert_eq!(names, vec!["a", "b", "c"]);
        Ok(())
    }

    #[test]
    fn implicit_results() -> Result<()> {
        let ses = open_ses()?;
        setup(&ses)?;

        let stmt = ses.prep("
            DECLARE
                c1 SYS_REFCURSOR;
                c2 SYS_REFCURSOR;
            BEGIN
                OPEN c1 FOR SELECT c1, c2 FROM test_cursor_rows WHERE c1 < 8 ORDER BY c1;
                DBMS_SQL.RETURN_RESULT(c1);
                OPEN c2 FOR SELECT c1, c2 FROM test_cursor_rows WHERE c1 > 8;
                DBMS_SQL.RETURN_RESULT(c2);
            END;
        ")?;
        stmt.exe(&mut [])?;
        let first = stmt.next_rset()?.expect("first result");
        assert_eq!(collect(&first)?, vec![(5, "a".to_string()), (7, "b".to_string())]);
        let second = stmt.next_rset()?.expect("second result");
        assert_eq!(collect(&second)?, vec![(9, "c".to_string())]);
        assert!(stmt.next_rset()?.is_none());
        Ok(())
    }
}
